//! Kong hmac-auth request signer.

use std::fmt::Debug;
use std::fmt::Formatter;
use std::fmt::Write;

use http::header::AUTHORIZATION;
use http::header::DATE;
use http::HeaderValue;
use log::debug;

use crate::hash;
use crate::request::SigningRequest;
use crate::time;
use crate::time::format_http_date;
use crate::time::DateTime;
use crate::Algorithm;
use crate::Charset;
use crate::Config;
use crate::Error;
use crate::Result;
use crate::SigningComponent;

/// Name of the header carrying the body digest.
const DIGEST: &str = "digest";

/// Signer that implements Kong API Gateway's `hmac-auth` authentication.
///
/// A signer is built once from a [`Config`] and can sign any number of
/// requests from any number of threads. Signing never mutates the signer:
/// per request decisions, like skipping the `digest` component for a
/// bodyless request, are scoped to the call.
///
/// - [HMAC Authentication (Kong)](https://docs.konghq.com/hub/kong-inc/hmac-auth/)
pub struct Signer {
    username: String,
    secret: Vec<u8>,
    algorithm: Algorithm,
    components: Vec<SigningComponent>,
    charset: Charset,

    time: Option<DateTime>,
}

impl Debug for Signer {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "Signer")
    }
}

impl Signer {
    /// Build a signer from a config.
    ///
    /// The config is checked completely here so that [`sign`] can only fail
    /// on request specific conditions: username and secret must be present,
    /// the algorithm and charset identifiers must be known, and the
    /// component list must be non empty with valid header names. Duplicate
    /// component names collapse onto their first occurrence.
    ///
    /// [`sign`]: Self::sign
    pub fn new(config: Config) -> Result<Self> {
        let username = config
            .username
            .ok_or_else(|| Error::config_invalid("username is required"))?;
        let secret = config
            .secret
            .ok_or_else(|| Error::config_invalid("secret is required"))?;

        let algorithm = match config.algorithm {
            Some(v) => v.parse()?,
            None => Algorithm::default(),
        };
        let charset: Charset = match config.charset {
            Some(v) => v.parse()?,
            None => Charset::default(),
        };

        let components = match config.headers {
            Some(names) => {
                let mut components = Vec::with_capacity(names.len());
                for name in names {
                    let component: SigningComponent = name.parse()?;
                    if !components.contains(&component) {
                        components.push(component);
                    }
                }
                if components.is_empty() {
                    return Err(Error::config_invalid("component list is empty"));
                }
                components
            }
            None => vec![
                SigningComponent::Date,
                SigningComponent::RequestLine,
                SigningComponent::Digest,
            ],
        };

        let secret = charset.encode(&secret)?.to_vec();

        Ok(Signer {
            username,
            secret,
            algorithm,
            components,
            charset,
            time: None,
        })
    }

    /// Specify the signing time.
    ///
    /// # Note
    ///
    /// We should always take current time to sign requests.
    /// Only use this function for testing.
    #[cfg(test)]
    pub fn with_time(mut self, time: DateTime) -> Self {
        self.time = Some(time);
        self
    }

    /// Sign the request parts.
    ///
    /// `body` is the payload the request will carry; pass `None` for
    /// bodyless requests. On success the `Authorization` header plus any
    /// generated `Date` and `Digest` headers are written onto `parts`. On
    /// error `parts` is left exactly as it was, so a failed attempt can be
    /// reported without sending a half signed request.
    pub fn sign(&self, parts: &mut http::request::Parts, body: Option<&[u8]>) -> Result<()> {
        let now = self.time.unwrap_or_else(time::now);
        let mut req = SigningRequest::build(parts);

        let components = self.prepare_headers(&mut req, body, now)?;
        let string_to_sign = string_to_sign(&components, &req)?;
        debug!("string to sign: {}", &string_to_sign);

        let signature = self
            .algorithm
            .sign(&self.secret, self.charset.encode(&string_to_sign)?);

        let advertised = components
            .iter()
            .map(|c| c.as_str())
            .collect::<Vec<_>>()
            .join(" ");

        let mut auth_value = String::new();
        write!(auth_value, "hmac username=\"{}\", ", self.username)?;
        write!(auth_value, "algorithm=\"{}\", ", self.algorithm)?;
        write!(auth_value, "headers=\"{advertised}\", ")?;
        write!(auth_value, "signature=\"{signature}\"")?;

        req.headers.insert(AUTHORIZATION, {
            let mut value: HeaderValue = auth_value.parse()?;
            value.set_sensitive(true);

            value
        });

        req.apply(parts);

        Ok(())
    }

    /// Fill in generated headers and return the components that take part
    /// in signing this call.
    ///
    /// The returned list equals the configured one except that `digest` is
    /// skipped when there is no body to digest. The skip applies to this
    /// call only.
    fn prepare_headers<'a>(
        &'a self,
        req: &mut SigningRequest,
        body: Option<&[u8]>,
        now: DateTime,
    ) -> Result<Vec<&'a SigningComponent>> {
        let mut effective = Vec::with_capacity(self.components.len());

        for component in &self.components {
            match component {
                SigningComponent::Date => {
                    // A caller provided date wins, even over a test time.
                    if !req.headers.contains_key(DATE) {
                        req.headers.insert(DATE, format_http_date(now).parse()?);
                    }
                }
                SigningComponent::Digest => match body {
                    Some(body) if !body.is_empty() => {
                        let digest = format!("SHA-256={}", hash::base64_sha256(body));
                        // A caller provided digest is replaced: the header
                        // must match the body actually signed.
                        req.headers.insert(DIGEST, digest.parse()?);
                    }
                    _ => continue,
                },
                _ => {}
            }

            effective.push(component);
        }

        Ok(effective)
    }
}

/// Construct the string to sign.
///
/// ## Format
///
/// One line per signing component, joined with `\n`, no trailing newline:
///
/// ```text
/// date: Mon, 15 Aug 2022 16:50:12 GMT
/// POST /v1/resource?x=1 HTTP/1.1
/// digest: SHA-256=AVq9f1zFei3ZS3WQ8ErYCEJzkF7jPsXOvq5iJ2qX+GI=
/// ```
///
/// The `request-line` component renders as `<METHOD> <path-and-query>
/// HTTP/1.1`. Every other component renders as `<name>: <value>` with the
/// name lowercased and the value taken from the request verbatim.
fn string_to_sign(components: &[&SigningComponent], req: &SigningRequest) -> Result<String> {
    let mut s = String::new();

    for (i, component) in components.iter().enumerate() {
        if i > 0 {
            s.write_str("\n")?;
        }

        match component {
            SigningComponent::RequestLine => {
                write!(s, "{} {} HTTP/1.1", req.method, req.path_and_query)?;
            }
            component => {
                let name = component.as_str();
                let value = req
                    .headers
                    .get(name)
                    .ok_or_else(|| Error::missing_header(format!("header {name} is not present")))?
                    .to_str()?;
                write!(s, "{name}: {value}")?;
            }
        }
    }

    Ok(s)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use chrono::Utc;
    use http::Request;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::ErrorKind;

    fn test_time() -> DateTime {
        chrono::DateTime::parse_from_rfc2822("Mon, 15 Aug 2022 16:50:12 GMT")
            .unwrap()
            .with_timezone(&Utc)
    }

    fn test_signer() -> Signer {
        Signer::new(Config::new().with_username("alice").with_secret("secret"))
            .unwrap()
            .with_time(test_time())
    }

    fn parts_of(req: Request<()>) -> http::request::Parts {
        req.into_parts().0
    }

    fn header_str<'a>(parts: &'a http::request::Parts, name: &str) -> &'a str {
        parts.headers.get(name).unwrap().to_str().unwrap()
    }

    #[test]
    fn test_sign_post_with_body() -> Result<()> {
        let _ = env_logger::builder().is_test(true).try_init();

        let signer = test_signer();
        let mut parts = parts_of(
            Request::post("http://127.0.0.1:8000/v1/resource?x=1")
                .body(())
                .unwrap(),
        );

        signer.sign(&mut parts, Some(br#"{"a":1}"#))?;

        assert_eq!("Mon, 15 Aug 2022 16:50:12 GMT", header_str(&parts, "date"));
        assert_eq!(
            "SHA-256=AVq9f1zFei3ZS3WQ8ErYCEJzkF7jPsXOvq5iJ2qX+GI=",
            header_str(&parts, "digest")
        );
        assert_eq!(
            "hmac username=\"alice\", algorithm=\"hmac-sha256\", headers=\"date request-line digest\", signature=\"4IhkEBklvSMmrxjFG78V253hWpujdiXTPJ6uyvVUK7Y=\"",
            header_str(&parts, "authorization")
        );
        assert!(parts.headers.get(AUTHORIZATION).unwrap().is_sensitive());

        Ok(())
    }

    #[test]
    fn test_sign_without_body_skips_digest() -> Result<()> {
        let _ = env_logger::builder().is_test(true).try_init();

        let signer = test_signer();

        let mut parts = parts_of(
            Request::get("http://127.0.0.1:8000/v1/resource")
                .body(())
                .unwrap(),
        );
        signer.sign(&mut parts, None)?;

        assert!(!parts.headers.contains_key("digest"));
        assert_eq!(
            "hmac username=\"alice\", algorithm=\"hmac-sha256\", headers=\"date request-line\", signature=\"j+8XiGgTPA5IynAGUfdKf80pHyattK/szVhu04D/klo=\"",
            header_str(&parts, "authorization")
        );

        // The skip is scoped to the call. The same signer includes the
        // digest again as soon as a request carries a body.
        let mut parts = parts_of(
            Request::post("http://127.0.0.1:8000/v1/resource?x=1")
                .body(())
                .unwrap(),
        );
        signer.sign(&mut parts, Some(br#"{"a":1}"#))?;

        assert!(parts.headers.contains_key("digest"));
        assert_eq!(
            "hmac username=\"alice\", algorithm=\"hmac-sha256\", headers=\"date request-line digest\", signature=\"4IhkEBklvSMmrxjFG78V253hWpujdiXTPJ6uyvVUK7Y=\"",
            header_str(&parts, "authorization")
        );

        Ok(())
    }

    #[test]
    fn test_sign_keeps_existing_date() -> Result<()> {
        let signer = test_signer();
        let mut parts = parts_of(
            Request::get("http://127.0.0.1:8000/v1/resource")
                .header("date", "Tue, 16 Aug 2022 08:00:00 GMT")
                .body(())
                .unwrap(),
        );

        signer.sign(&mut parts, None)?;

        assert_eq!("Tue, 16 Aug 2022 08:00:00 GMT", header_str(&parts, "date"));
        assert_eq!(
            "hmac username=\"alice\", algorithm=\"hmac-sha256\", headers=\"date request-line\", signature=\"8MJsy62Gw/KWRdWl2xgk15pxc60qYmBHDqvLAfoFYmM=\"",
            header_str(&parts, "authorization")
        );

        Ok(())
    }

    #[test]
    fn test_sign_custom_header_component() -> Result<()> {
        let signer = Signer::new(
            Config::new()
                .with_username("alice")
                .with_secret("secret")
                .with_headers(["date", "request-line", "x-api-key"]),
        )?
        .with_time(test_time());

        let mut parts = parts_of(
            Request::get("http://127.0.0.1:8000/status")
                .header("X-Api-Key", "kong-rs-0042")
                .body(())
                .unwrap(),
        );

        signer.sign(&mut parts, None)?;

        assert_eq!(
            "hmac username=\"alice\", algorithm=\"hmac-sha256\", headers=\"date request-line x-api-key\", signature=\"fmCWmg1/iJioSpsLlUiktwvIB45XBNQKsGNtbtM2Y2E=\"",
            header_str(&parts, "authorization")
        );

        Ok(())
    }

    #[test]
    fn test_sign_algorithms() -> Result<()> {
        let cases = [
            ("hmac-sha1", "kehGeTyyOYl/j6Uub5UVKWfqO3c="),
            ("hmac-sha256", "4IhkEBklvSMmrxjFG78V253hWpujdiXTPJ6uyvVUK7Y="),
            (
                "hmac-sha384",
                "1etIG9sHuujVvg/nkRDDPAk44c/6vtAzwdEzjL+WfNzYs7ClzOdUbepEgKF4bEVF",
            ),
            (
                "hmac-sha512",
                "o0QjfsZcMXLCoynSlg6yWp8cvVXCZfuYBVPryDvqGwSGse/yTZsrtZIM60YQ7TomUk/9cH5/5Vlc58bDL+9F1A==",
            ),
        ];

        for (algorithm, expected) in cases {
            let signer = Signer::new(
                Config::new()
                    .with_username("alice")
                    .with_secret("secret")
                    .with_algorithm(algorithm),
            )?
            .with_time(test_time());

            let mut parts = parts_of(
                Request::post("http://127.0.0.1:8000/v1/resource?x=1")
                    .body(())
                    .unwrap(),
            );
            signer.sign(&mut parts, Some(br#"{"a":1}"#))?;

            assert_eq!(
                format!("hmac username=\"alice\", algorithm=\"{algorithm}\", headers=\"date request-line digest\", signature=\"{expected}\""),
                header_str(&parts, "authorization"),
            );
        }

        Ok(())
    }

    #[test]
    fn test_unsupported_algorithm() {
        let err = Signer::new(
            Config::new()
                .with_username("alice")
                .with_secret("secret")
                .with_algorithm("hmac-md2"),
        )
        .unwrap_err();

        assert_eq!(ErrorKind::UnsupportedAlgorithm, err.kind());
    }

    #[test]
    fn test_missing_header_leaves_request_untouched() {
        let signer = Signer::new(
            Config::new()
                .with_username("alice")
                .with_secret("secret")
                .with_headers(["date", "request-line", "x-api-key"]),
        )
        .unwrap()
        .with_time(test_time());

        let mut parts = parts_of(
            Request::get("http://127.0.0.1:8000/status")
                .body(())
                .unwrap(),
        );

        let err = signer.sign(&mut parts, None).unwrap_err();

        assert_eq!(ErrorKind::MissingHeader, err.kind());
        // Nothing was written back, not even the generated date.
        assert!(parts.headers.is_empty());
    }

    #[test]
    fn test_opaque_header_value_rejected() {
        let signer = Signer::new(
            Config::new()
                .with_username("alice")
                .with_secret("secret")
                .with_headers(["x-blob"]),
        )
        .unwrap();

        let mut parts = parts_of(
            Request::get("http://127.0.0.1:8000/status")
                .header("x-blob", HeaderValue::from_bytes(&[0xE9]).unwrap())
                .body(())
                .unwrap(),
        );

        let err = signer.sign(&mut parts, None).unwrap_err();
        assert_eq!(ErrorKind::RequestInvalid, err.kind());
    }

    #[test]
    fn test_sign_is_deterministic() -> Result<()> {
        let signer = test_signer();

        let mut first = parts_of(
            Request::post("http://127.0.0.1:8000/v1/resource?x=1")
                .body(())
                .unwrap(),
        );
        let mut second = parts_of(
            Request::post("http://127.0.0.1:8000/v1/resource?x=1")
                .body(())
                .unwrap(),
        );

        signer.sign(&mut first, Some(br#"{"a":1}"#))?;
        signer.sign(&mut second, Some(br#"{"a":1}"#))?;

        assert_eq!(
            first.headers.get(AUTHORIZATION),
            second.headers.get(AUTHORIZATION)
        );

        Ok(())
    }

    #[test]
    fn test_duplicate_components_collapse() -> Result<()> {
        let signer = Signer::new(
            Config::new()
                .with_username("alice")
                .with_secret("secret")
                .with_headers(["date", "Date", "request-line", "date"]),
        )?
        .with_time(test_time());

        let mut parts = parts_of(
            Request::get("http://127.0.0.1:8000/v1/resource")
                .body(())
                .unwrap(),
        );
        signer.sign(&mut parts, None)?;

        // Same effective components as plain ["date", "request-line"].
        assert_eq!(
            "hmac username=\"alice\", algorithm=\"hmac-sha256\", headers=\"date request-line\", signature=\"j+8XiGgTPA5IynAGUfdKf80pHyattK/szVhu04D/klo=\"",
            header_str(&parts, "authorization")
        );

        Ok(())
    }

    #[test]
    fn test_digest_overwrites_preset_value() -> Result<()> {
        let signer = test_signer();
        let mut parts = parts_of(
            Request::post("http://127.0.0.1:8000/v1/resource?x=1")
                .header("digest", "SHA-256=bogus")
                .body(())
                .unwrap(),
        );

        signer.sign(&mut parts, Some(br#"{"a":1}"#))?;

        assert_eq!(
            "SHA-256=AVq9f1zFei3ZS3WQ8ErYCEJzkF7jPsXOvq5iJ2qX+GI=",
            header_str(&parts, "digest")
        );

        Ok(())
    }

    #[test]
    fn test_invalid_config() {
        let cases = [
            (Config::new().with_secret("secret"), ErrorKind::ConfigInvalid),
            (
                Config::new().with_username("alice"),
                ErrorKind::ConfigInvalid,
            ),
            (
                Config::new()
                    .with_username("alice")
                    .with_secret("secret")
                    .with_headers(Vec::<String>::new()),
                ErrorKind::ConfigInvalid,
            ),
            (
                Config::new()
                    .with_username("alice")
                    .with_secret("pässwort")
                    .with_charset("us-ascii"),
                ErrorKind::Encoding,
            ),
            (
                Config::new()
                    .with_username("alice")
                    .with_secret("secret")
                    .with_charset("latin-1"),
                ErrorKind::ConfigInvalid,
            ),
        ];

        for (config, expected) in cases {
            let err = Signer::new(config).unwrap_err();
            assert_eq!(expected, err.kind());
        }
    }

    #[test]
    fn test_signature_round_trips_with_verifier() -> Result<()> {
        let _ = env_logger::builder().is_test(true).try_init();

        let signer = test_signer();
        let mut parts = parts_of(
            Request::post("http://127.0.0.1:8000/v1/resource?x=1")
                .body(())
                .unwrap(),
        );
        signer.sign(&mut parts, Some(br#"{"a":1}"#))?;

        // Parse the emitted header the way a verifier would.
        let authorization = header_str(&parts, "authorization");
        let fields: HashMap<&str, &str> = authorization
            .strip_prefix("hmac ")
            .unwrap()
            .split(", ")
            .map(|pair| {
                let (k, v) = pair.split_once('=').unwrap();
                (k, v.trim_matches('"'))
            })
            .collect();

        assert_eq!("alice", fields["username"]);
        assert_eq!("hmac-sha256", fields["algorithm"]);

        // Rebuild the signing string from the advertised components and the
        // headers that actually ended up on the request.
        let canonical = fields["headers"]
            .split(' ')
            .map(|name| match name {
                "request-line" => "POST /v1/resource?x=1 HTTP/1.1".to_string(),
                name => format!("{name}: {}", header_str(&parts, name)),
            })
            .collect::<Vec<_>>()
            .join("\n");

        assert_eq!(
            "date: Mon, 15 Aug 2022 16:50:12 GMT\n\
             POST /v1/resource?x=1 HTTP/1.1\n\
             digest: SHA-256=AVq9f1zFei3ZS3WQ8ErYCEJzkF7jPsXOvq5iJ2qX+GI=",
            canonical
        );
        assert_eq!(
            fields["signature"],
            hash::base64_hmac_sha256(b"secret", canonical.as_bytes())
        );

        Ok(())
    }

    #[test]
    fn test_signer_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}

        assert_send_sync::<Signer>();
    }
}
