use chrono::{Duration, Utc};
use finance_repo::user_repo::UserId;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation};
use serde::Deserialize;
use serde::Serialize;

#[derive(Clone)]
pub struct JWTAuth {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

/// `jti` names the stored token row; a token is only honoured while that row exists.
#[derive(Serialize, Deserialize, PartialEq, Debug)]
pub struct Claims {
    exp: usize,
    pub sub: UserId,
    pub jti: String,
}

impl JWTAuth {
    const EXPIRE_TIME: i64 = 30 * 24 * 60 * 60;

    pub fn from_secret(secret: Vec<u8>) -> JWTAuth {
        JWTAuth {
            encoding_key: EncodingKey::from_secret(&secret),
            decoding_key: DecodingKey::from_secret(&secret),
        }
    }

    pub fn create_token(
        &self,
        user_id: UserId,
        token_id: &str,
    ) -> Result<String, jsonwebtoken::errors::Error> {
        let claims = Claims {
            exp: Self::generate_exp(),
            sub: user_id,
            jti: token_id.to_owned(),
        };

        jsonwebtoken::encode(&Header::default(), &claims, &self.encoding_key)
    }

    pub fn validate_token(&self, token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
        let claim =
            jsonwebtoken::decode::<Claims>(token, &self.decoding_key, &Validation::default())?;
        Ok(claim.claims)
    }

    fn generate_exp() -> usize {
        (Utc::now() + Duration::seconds(Self::EXPIRE_TIME)).timestamp() as usize
    }
}
