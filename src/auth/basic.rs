use base64::prelude::*;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum BasicAuthError {
    #[error("authorization header must start with 'Basic '")]
    MissingScheme,
    #[error("invalid base64 encoding")]
    Encoding,
    #[error("credentials must be in format 'username:password'")]
    Format,
}

/// Parses `Authorization: Basic <base64(username:password)>`.
///
/// The password may itself contain colons; only the first one separates.
pub fn parse_basic_auth_header(header: &str) -> Result<(String, String), BasicAuthError> {
    let encoded = header
        .strip_prefix("Basic ")
        .or_else(|| header.strip_prefix("basic "))
        .ok_or(BasicAuthError::MissingScheme)?;

    let decoded = BASE64_STANDARD
        .decode(encoded.trim().as_bytes())
        .map_err(|_| BasicAuthError::Encoding)?;
    let decoded = String::from_utf8(decoded).map_err(|_| BasicAuthError::Encoding)?;

    let (username, password) = decoded.split_once(':').ok_or(BasicAuthError::Format)?;
    if username.is_empty() {
        return Err(BasicAuthError::Format);
    }
    Ok((username.to_string(), password.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_valid_header() {
        // base64("user:pass")
        let (username, password) = parse_basic_auth_header("Basic dXNlcjpwYXNz").unwrap();
        assert_eq!(username, "user");
        assert_eq!(password, "pass");
    }

    #[test]
    fn keeps_colons_in_password() {
        // base64("admin:p@ss:word")
        let (username, password) =
            parse_basic_auth_header("Basic YWRtaW46cEBzczp3b3Jk").unwrap();
        assert_eq!(username, "admin");
        assert_eq!(password, "p@ss:word");
    }

    #[test]
    fn rejects_missing_scheme() {
        assert_eq!(
            parse_basic_auth_header("dXNlcjpwYXNz"),
            Err(BasicAuthError::MissingScheme)
        );
        assert_eq!(
            parse_basic_auth_header("Bearer abc"),
            Err(BasicAuthError::MissingScheme)
        );
    }

    #[test]
    fn rejects_bad_base64() {
        assert_eq!(
            parse_basic_auth_header("Basic !!invalid!!"),
            Err(BasicAuthError::Encoding)
        );
    }

    #[test]
    fn rejects_missing_colon() {
        // base64("userpass")
        assert_eq!(
            parse_basic_auth_header("Basic dXNlcnBhc3M="),
            Err(BasicAuthError::Format)
        );
    }
}
