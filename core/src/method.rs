//! The closed set of HTTP verbs the client speaks.

use std::fmt;
use std::str::FromStr;

use crate::error::ParseMethodError;

/// HTTP method for a request. Unset methods default to `Get`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RequestMethod {
    #[default]
    Get,
    Post,
    Put,
    Delete,
}

impl RequestMethod {
    /// The verb as written on the request line.
    pub fn as_str(self) -> &'static str {
        match self {
            RequestMethod::Get => "GET",
            RequestMethod::Post => "POST",
            RequestMethod::Put => "PUT",
            RequestMethod::Delete => "DELETE",
        }
    }

    /// Whether the request parameters are written as a form body.
    pub fn has_body(self) -> bool {
        matches!(self, RequestMethod::Post | RequestMethod::Put)
    }
}

impl fmt::Display for RequestMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RequestMethod {
    type Err = ParseMethodError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "GET" => Ok(RequestMethod::Get),
            "POST" => Ok(RequestMethod::Post),
            "PUT" => Ok(RequestMethod::Put),
            "DELETE" => Ok(RequestMethod::Delete),
            _ => Err(ParseMethodError(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_get() {
        assert_eq!(RequestMethod::default(), RequestMethod::Get);
    }

    #[test]
    fn wire_verbs() {
        assert_eq!(RequestMethod::Get.to_string(), "GET");
        assert_eq!(RequestMethod::Post.to_string(), "POST");
        assert_eq!(RequestMethod::Put.to_string(), "PUT");
        assert_eq!(RequestMethod::Delete.to_string(), "DELETE");
    }

    #[test]
    fn only_post_and_put_carry_a_body() {
        assert!(!RequestMethod::Get.has_body());
        assert!(RequestMethod::Post.has_body());
        assert!(RequestMethod::Put.has_body());
        assert!(!RequestMethod::Delete.has_body());
    }

    #[test]
    fn parse_is_case_insensitive() {
        assert_eq!("delete".parse::<RequestMethod>(), Ok(RequestMethod::Delete));
        assert_eq!("Put".parse::<RequestMethod>(), Ok(RequestMethod::Put));
    }

    #[test]
    fn parse_rejects_unknown_verbs() {
        let err = "PATCH".parse::<RequestMethod>().unwrap_err();
        assert_eq!(err, ParseMethodError("PATCH".to_string()));
    }
}
