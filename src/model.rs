//! Wire types shared by the HTTP API, the job service, and the profiler.

use serde::{Deserialize, Serialize};

use crate::jobs::token::Token;

/// Version of the profiling API, also advertised in the `Server` header.
pub const API_VERSION: &str = api_version!();

/// One opaque input token of the document to profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InputToken(pub String);

impl From<&str> for InputToken {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Profile document produced by the external profiler. Treated as opaque JSON.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Profile(pub serde_json::Value);

/// Body of a `POST /profile` request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileRequest {
    #[serde(rename = "Language")]
    pub language: String,
    #[serde(rename = "Tokens", default)]
    pub tokens: Vec<InputToken>,
}

/// Answer to a poll. Unfinished jobs carry no profile and `done == false`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollResponse {
    #[serde(rename = "Profile", default, skip_serializing_if = "Option::is_none")]
    pub profile: Option<Profile>,
    #[serde(rename = "Token")]
    pub token: Token,
    #[serde(rename = "Language", default)]
    pub language: String,
    #[serde(rename = "Status")]
    pub status: String,
    #[serde(rename = "Done")]
    pub done: bool,
}

impl PollResponse {
    pub fn pending(token: Token, status: String) -> Self {
        Self {
            profile: None,
            token,
            language: String::new(),
            status,
            done: false,
        }
    }

    pub fn done(token: Token, language: String, profile: Profile) -> Self {
        Self {
            profile: Some(profile),
            token,
            language,
            status: "done".to_string(),
            done: true,
        }
    }
}

/// Available backend languages.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Languages {
    #[serde(rename = "Languages")]
    pub languages: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_uses_capitalized_field_names() {
        let req: ProfileRequest =
            serde_json::from_str(r#"{"Language": "eng", "Tokens": ["foo", "bar"]}"#).unwrap();
        assert_eq!(req.language, "eng");
        assert_eq!(req.tokens, vec![InputToken::from("foo"), InputToken::from("bar")]);
    }

    #[test]
    fn pending_response_omits_profile() {
        let resp = PollResponse::pending(Token::from("abc"), "eating cold steel".into());
        let json = serde_json::to_value(&resp).unwrap();

        assert_eq!(json["Done"], false);
        assert_eq!(json["Token"]["ID"], "abc");
        assert!(json.get("Profile").is_none());
    }

    #[test]
    fn done_response_carries_profile_and_language() {
        let profile = Profile(serde_json::json!({"foo": {"N": 1}}));
        let resp = PollResponse::done(Token::from("abc"), "eng".into(), profile);
        let json = serde_json::to_value(&resp).unwrap();

        assert_eq!(json["Done"], true);
        assert_eq!(json["Status"], "done");
        assert_eq!(json["Language"], "eng");
        assert_eq!(json["Profile"]["foo"]["N"], 1);
    }
}
