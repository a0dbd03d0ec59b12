// Data models for the webook API

pub mod article;
pub mod user;

use serde::{Deserialize, Serialize};

use crate::error::{Result, TransportError};

/// Envelope every webook endpoint answers with
///
/// `code == 0` is success; anything else carries a message for the user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub code: i32,
    #[serde(default)]
    pub msg: String,
    pub data: Option<T>,
}

impl<T> Envelope<T> {
    /// The payload of a successful envelope
    pub fn into_data(self) -> Result<Option<T>> {
        if self.code != 0 {
            return Err(TransportError::Api {
                code: self.code,
                msg: self.msg,
            });
        }
        Ok(self.data)
    }

    /// Message of a successful envelope, for endpoints without payload
    pub fn into_message(self) -> Result<String> {
        if self.code != 0 {
            return Err(TransportError::Api {
                code: self.code,
                msg: self.msg,
            });
        }
        Ok(self.msg)
    }
}

/// Pagination body shared by the list endpoints
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct ListRequest {
    pub offset: i64,
    pub limit: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_envelope() {
        let env: Envelope<Vec<i32>> =
            serde_json::from_str(r#"{"code":0,"msg":"ok","data":[1,2]}"#).unwrap();
        assert_eq!(env.into_data().unwrap(), Some(vec![1, 2]));
    }

    #[test]
    fn test_null_and_missing_data() {
        let env: Envelope<Vec<i32>> =
            serde_json::from_str(r#"{"code":0,"msg":"ok","data":null}"#).unwrap();
        assert_eq!(env.into_data().unwrap(), None);

        let env: Envelope<String> = serde_json::from_str(r#"{"code":0,"msg":"登录成功"}"#).unwrap();
        assert_eq!(env.into_message().unwrap(), "登录成功");
    }

    #[test]
    fn test_error_envelope() {
        let env: Envelope<String> =
            serde_json::from_str(r#"{"code":400,"msg":"邮箱或密码错误"}"#).unwrap();
        let err = env.into_data().unwrap_err();
        assert!(matches!(err, TransportError::Api { code: 400, .. }));
        assert_eq!(err.to_string(), "API error 400: 邮箱或密码错误");
    }
}
