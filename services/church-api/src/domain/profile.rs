/// ユーザープロフィールとサインアップ入力の検証
use serde::{Deserialize, Serialize};

use super::validation::{optional_text, ValidationErrors};

/// 登録可能な最低年齢
pub const MINIMUM_AGE: i64 = 18;

/// 電話番号の最小文字数
pub const MINIMUM_PHONE_LENGTH: usize = 10;

/// POST /signup-profile のリクエストボディ
///
/// 欠落フィールドをフィールド単位のエラーとして返すため、全フィールドをOptionで受ける。
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupProfileInput {
    pub user_id: Option<String>,
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub age: Option<i64>,
    pub country: Option<String>,
    pub bio: Option<String>,
    pub profile_image_url: Option<String>,
}

/// 検証済みのプロフィール更新内容
///
/// リポジトリはこの内容を既存ドキュメントへマージする。
#[derive(Debug, Clone, PartialEq)]
pub struct ProfileUpdate {
    pub user_id: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub age: u32,
    pub country: String,
    pub bio: Option<String>,
    pub profile_image_url: Option<String>,
}

impl ProfileUpdate {
    /// 前方一致検索用の正規化済み名前
    pub fn search_name(&self) -> String {
        normalize_search_name(&self.name)
    }
}

/// 保存済みユーザープロフィール
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub user_id: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub age: u32,
    pub country: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_image_url: Option<String>,
    /// 検索用の小文字化した名前（レスポンスには含めない）
    #[serde(default, skip_serializing)]
    pub search_name: String,
    pub created_at: String,
    pub updated_at: String,
}

impl UserProfile {
    /// 既存ドキュメント（あれば）に更新内容をマージした結果を作る
    ///
    /// createdAtは初回のみ設定し、updatedAtは常に更新する。
    /// bio/profileImageUrlは指定された場合のみ上書きする。
    pub fn merged(existing: Option<&UserProfile>, update: &ProfileUpdate, now: &str) -> Self {
        let created_at = existing
            .map(|p| p.created_at.clone())
            .unwrap_or_else(|| now.to_string());

        Self {
            user_id: update.user_id.clone(),
            name: update.name.clone(),
            email: update.email.clone(),
            phone: update.phone.clone(),
            age: update.age,
            country: update.country.clone(),
            bio: update
                .bio
                .clone()
                .or_else(|| existing.and_then(|p| p.bio.clone())),
            profile_image_url: update
                .profile_image_url
                .clone()
                .or_else(|| existing.and_then(|p| p.profile_image_url.clone())),
            search_name: update.search_name(),
            created_at,
            updated_at: now.to_string(),
        }
    }
}

impl SignupProfileInput {
    /// 入力を検証してProfileUpdateに変換する
    ///
    /// チェック内容:
    /// - userId, name, countryが空でない
    /// - emailに`@`を含む
    /// - phoneが10文字以上
    /// - ageが18以上
    pub fn validate(self) -> Result<ProfileUpdate, ValidationErrors> {
        let mut errors = ValidationErrors::new();

        let user_id = errors.require_text("userId", self.user_id);
        let name = errors.require_text("name", self.name);

        let email = errors.require_text("email", self.email);
        if let Some(email) = &email {
            if !email.contains('@') {
                errors.push("email", "email must contain '@'");
            }
        }

        let phone = errors.require_text("phone", self.phone);
        if let Some(phone) = &phone {
            if phone.chars().count() < MINIMUM_PHONE_LENGTH {
                errors.push(
                    "phone",
                    format!("phone must be at least {} characters", MINIMUM_PHONE_LENGTH),
                );
            }
        }

        let age = match self.age {
            None => {
                errors.push("age", "age is required");
                None
            }
            Some(age) if age < MINIMUM_AGE => {
                errors.push("age", format!("age must be at least {}", MINIMUM_AGE));
                None
            }
            Some(age) => match u32::try_from(age) {
                Ok(age) => Some(age),
                Err(_) => {
                    errors.push("age", "age is out of range");
                    None
                }
            },
        };

        let country = errors.require_text("country", self.country);

        match (user_id, name, email, phone, age, country) {
            (Some(user_id), Some(name), Some(email), Some(phone), Some(age), Some(country))
                if errors.is_empty() =>
            {
                Ok(ProfileUpdate {
                    user_id,
                    name,
                    email,
                    phone,
                    age,
                    country,
                    bio: optional_text(self.bio),
                    profile_image_url: optional_text(self.profile_image_url),
                })
            }
            _ => Err(errors),
        }
    }
}

/// 名前を前方一致検索用に正規化する（前後空白除去 + 小文字化）
pub fn normalize_search_name(name: &str) -> String {
    name.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_input() -> SignupProfileInput {
        SignupProfileInput {
            user_id: Some("u1".to_string()),
            name: Some("Jo Ann".to_string()),
            email: Some("a@b.com".to_string()),
            phone: Some("1234567890".to_string()),
            age: Some(20),
            country: Some("US".to_string()),
            bio: None,
            profile_image_url: None,
        }
    }

    fn error_fields(errors: &ValidationErrors) -> Vec<&str> {
        errors.errors().iter().map(|e| e.field.as_str()).collect()
    }

    #[test]
    fn test_minimal_payload_is_accepted() {
        let update = valid_input().validate().unwrap();

        assert_eq!(update.user_id, "u1");
        assert_eq!(update.name, "Jo Ann");
        assert_eq!(update.age, 20);
        assert_eq!(update.search_name(), "jo ann");
        assert!(update.bio.is_none());
    }

    #[test]
    fn test_payload_from_json() {
        let input: SignupProfileInput = serde_json::from_str(
            r#"{"userId":"u1","name":"Jo Ann","email":"a@b.com","phone":"1234567890","age":20,"country":"US"}"#,
        )
        .unwrap();

        assert!(input.validate().is_ok());
    }

    #[test]
    fn test_rejects_underage() {
        let mut input = valid_input();
        input.age = Some(17);

        let errors = input.validate().unwrap_err();
        assert_eq!(error_fields(&errors), vec!["age"]);
    }

    #[test]
    fn test_accepts_exactly_minimum_age() {
        let mut input = valid_input();
        input.age = Some(18);
        assert!(input.validate().is_ok());
    }

    #[test]
    fn test_rejects_short_phone() {
        let mut input = valid_input();
        input.phone = Some("123456789".to_string());

        let errors = input.validate().unwrap_err();
        assert_eq!(error_fields(&errors), vec!["phone"]);
    }

    #[test]
    fn test_rejects_email_without_at() {
        let mut input = valid_input();
        input.email = Some("ab.com".to_string());

        let errors = input.validate().unwrap_err();
        assert_eq!(error_fields(&errors), vec!["email"]);
    }

    #[test]
    fn test_collects_every_field_error() {
        let errors = SignupProfileInput::default().validate().unwrap_err();

        assert_eq!(
            error_fields(&errors),
            vec!["userId", "name", "email", "phone", "age", "country"]
        );
    }

    #[test]
    fn test_optional_fields_are_trimmed() {
        let mut input = valid_input();
        input.bio = Some("  Choir member ".to_string());
        input.profile_image_url = Some("   ".to_string());

        let update = input.validate().unwrap();
        assert_eq!(update.bio, Some("Choir member".to_string()));
        assert!(update.profile_image_url.is_none());
    }

    #[test]
    fn test_merged_keeps_created_at_and_optional_fields() {
        let mut first = valid_input();
        first.bio = Some("hello".to_string());
        let first = first.validate().unwrap();
        let existing = UserProfile::merged(None, &first, "2024-01-01T00:00:00.000Z");

        let mut second = valid_input();
        second.name = Some("Joanna".to_string());
        let second = second.validate().unwrap();
        let merged = UserProfile::merged(Some(&existing), &second, "2024-02-01T00:00:00.000Z");

        assert_eq!(merged.name, "Joanna");
        assert_eq!(merged.search_name, "joanna");
        assert_eq!(merged.bio, Some("hello".to_string()));
        assert_eq!(merged.created_at, "2024-01-01T00:00:00.000Z");
        assert_eq!(merged.updated_at, "2024-02-01T00:00:00.000Z");
    }

    #[test]
    fn test_search_name_is_not_serialized() {
        let update = valid_input().validate().unwrap();
        let profile = UserProfile::merged(None, &update, "2024-01-01T00:00:00.000Z");
        let json = serde_json::to_value(&profile).unwrap();

        assert!(json.get("searchName").is_none());
        assert_eq!(json["userId"], "u1");
        assert!(json.get("bio").is_none());
    }
}
