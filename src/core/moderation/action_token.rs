// Action tokens - the identifiers attached to the moderation buttons.
//
// Slack echoes the `action_id` back when a moderator clicks a button, so the
// token is the only link from a decision back to the original request.

use std::fmt;
use std::str::FromStr;
use thiserror::Error;

const APPROVE_PREFIX: &str = "approve";
const APPROVE_NO_BROADCAST_PREFIX: &str = "approve-no-broadcast";
const REJECT_PREFIX: &str = "reject";
const DELIMITER: char = ':';

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ActionTokenError {
    #[error("action id has no ':' delimiter")]
    MissingDelimiter,

    #[error("unknown action prefix: {0}")]
    UnknownPrefix(String),
}

/// A moderator decision, tagged with the correlation hash of the request.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ActionToken {
    /// Post the message with an @channel broadcast
    Approve(String),
    /// Post the message without alerting the channel
    ApproveNoBroadcast(String),
    /// Reject the request and notify the requester
    Reject(String),
}

impl ActionToken {
    /// The correlation hash carried by this token, exactly as it was given.
    pub fn hash(&self) -> &str {
        match self {
            ActionToken::Approve(hash)
            | ActionToken::ApproveNoBroadcast(hash)
            | ActionToken::Reject(hash) => hash,
        }
    }

    fn prefix(&self) -> &'static str {
        match self {
            ActionToken::Approve(_) => APPROVE_PREFIX,
            ActionToken::ApproveNoBroadcast(_) => APPROVE_NO_BROADCAST_PREFIX,
            ActionToken::Reject(_) => REJECT_PREFIX,
        }
    }

    /// All three decisions for one request, in button order.
    pub fn decisions_for(hash: &str) -> [ActionToken; 3] {
        [
            ActionToken::Approve(hash.to_string()),
            ActionToken::ApproveNoBroadcast(hash.to_string()),
            ActionToken::Reject(hash.to_string()),
        ]
    }
}

impl fmt::Display for ActionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.prefix(), DELIMITER, self.hash())
    }
}

impl FromStr for ActionToken {
    type Err = ActionTokenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // Only the first delimiter separates the prefix; the hash is opaque,
        // and may be empty or contain the delimiter itself.
        let (prefix, hash) = s
            .split_once(DELIMITER)
            .ok_or(ActionTokenError::MissingDelimiter)?;

        let hash = hash.to_string();
        match prefix {
            APPROVE_PREFIX => Ok(ActionToken::Approve(hash)),
            APPROVE_NO_BROADCAST_PREFIX => Ok(ActionToken::ApproveNoBroadcast(hash)),
            REJECT_PREFIX => Ok(ActionToken::Reject(hash)),
            other => Err(ActionTokenError::UnknownPrefix(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_wire_format() {
        assert_eq!(ActionToken::Approve("abc123".into()).to_string(), "approve:abc123");
        assert_eq!(
            ActionToken::ApproveNoBroadcast("abc123".into()).to_string(),
            "approve-no-broadcast:abc123"
        );
        assert_eq!(ActionToken::Reject("abc123".into()).to_string(), "reject:abc123");
    }

    #[test]
    fn test_parse_known_prefixes() {
        assert_eq!(
            "approve-no-broadcast:9f86d081".parse::<ActionToken>().unwrap(),
            ActionToken::ApproveNoBroadcast("9f86d081".into())
        );
        assert_eq!(
            "reject:9f86d081".parse::<ActionToken>().unwrap(),
            ActionToken::Reject("9f86d081".into())
        );
    }

    #[test]
    fn test_hash_containing_delimiter_survives() {
        let token = ActionToken::Approve("a:b:c".into());
        let parsed: ActionToken = token.to_string().parse().unwrap();

        assert_eq!(parsed, token);
        assert_eq!(parsed.hash(), "a:b:c");
    }

    #[test]
    fn test_empty_hash_parses_back() {
        let token = ActionToken::Approve(String::new());

        assert_eq!(token.to_string(), "approve:");
        assert_eq!(token.to_string().parse::<ActionToken>(), Ok(token));
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(
            "approve".parse::<ActionToken>(),
            Err(ActionTokenError::MissingDelimiter)
        );
        assert_eq!(
            "APP_abc:123".parse::<ActionToken>(),
            Err(ActionTokenError::UnknownPrefix("APP_abc".into()))
        );
    }

    #[test]
    fn test_decisions_for_keeps_button_order() {
        let ids: Vec<String> = ActionToken::decisions_for("h")
            .iter()
            .map(ToString::to_string)
            .collect();

        assert_eq!(ids, vec!["approve:h", "approve-no-broadcast:h", "reject:h"]);
    }

    proptest! {
        /// Whatever the hash, writing a token out and parsing it back is lossless.
        #[test]
        fn prop_token_roundtrip(hash in any::<String>(), kind in 0usize..3) {
            let token = ActionToken::decisions_for(&hash)[kind].clone();
            let parsed = token.to_string().parse::<ActionToken>();

            prop_assert_eq!(parsed, Ok(token));
        }
    }
}
