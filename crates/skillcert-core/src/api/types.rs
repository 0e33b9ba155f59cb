//! Wire types for the portal API.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Attempts allowed per payment before repayment is required.
pub const MAX_ATTEMPTS: u32 = 3;

/// Minimum score (out of 10) that earns a certificate.
pub const PASS_MARK: u32 = 7;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub role: String,
    #[serde(default)]
    pub is_admin: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthResponse {
    pub user: User,
    pub access_token: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MeResponse {
    pub user: User,
}

#[derive(Debug, Clone, Serialize)]
pub struct SignupRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct GoogleLoginRequest {
    pub email: String,
    pub name: String,
    pub role: String,
}

/// Display/translation language for question text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    Ur,
}

impl Language {
    pub fn code(self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Ur => "ur",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Language::En => Language::Ur,
            Language::Ur => Language::En,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Language::En => "English",
            Language::Ur => "اردو",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "en" | "english" => Ok(Language::En),
            "ur" | "urdu" => Ok(Language::Ur),
            other => Err(format!("Unsupported language '{other}' (expected en or ur)")),
        }
    }
}

/// Server-reported attempt counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "AttemptInfoWire")]
pub struct AttemptInfo {
    pub attempt_count: u32,
    pub remaining_attempts: u32,
    pub has_passed: bool,
}

impl AttemptInfo {
    pub fn new(attempt_count: u32, has_passed: bool) -> Self {
        Self {
            attempt_count,
            remaining_attempts: MAX_ATTEMPTS.saturating_sub(attempt_count),
            has_passed,
        }
    }
}

#[derive(Deserialize)]
struct AttemptInfoWire {
    #[serde(default)]
    attempt_count: u32,
    #[serde(default)]
    remaining_attempts: Option<u32>,
    #[serde(default)]
    has_passed: bool,
}

impl From<AttemptInfoWire> for AttemptInfo {
    fn from(wire: AttemptInfoWire) -> Self {
        let mut info = AttemptInfo::new(wire.attempt_count, wire.has_passed);
        if let Some(remaining) = wire.remaining_attempts {
            info.remaining_attempts = remaining;
        }
        info
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AttemptRecord {
    pub id: i64,
    pub score: u32,
    pub attempt_number: u32,
    pub passed: bool,
    pub timestamp: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AttemptsResponse {
    pub attempts: Vec<AttemptRecord>,
}

/// Who pays for the certification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    /// The test taker pays the standard fee.
    #[serde(rename = "self")]
    SelfPay,
    /// A registered facilitator pays the discounted fee.
    Facilitator,
}

impl PaymentMethod {
    pub const STANDARD_FEE: u32 = 800;
    pub const FACILITATOR_FEE: u32 = 500;

    pub fn amount(self) -> u32 {
        match self {
            PaymentMethod::SelfPay => Self::STANDARD_FEE,
            PaymentMethod::Facilitator => Self::FACILITATOR_FEE,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            PaymentMethod::SelfPay => "Pay by Yourself",
            PaymentMethod::Facilitator => "Payment by Facilitator",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordPaymentRequest {
    pub amount: u32,
    pub discounted: bool,
}

/// A multiple-choice option label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Choice {
    A,
    B,
    C,
    D,
}

impl Choice {
    pub const ALL: [Choice; 4] = [Choice::A, Choice::B, Choice::C, Choice::D];

    pub fn letter(self) -> char {
        match self {
            Choice::A => 'A',
            Choice::B => 'B',
            Choice::C => 'C',
            Choice::D => 'D',
        }
    }
}

impl FromStr for Choice {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "A" => Ok(Choice::A),
            "B" => Ok(Choice::B),
            "C" => Ok(Choice::C),
            "D" => Ok(Choice::D),
            other => Err(format!("'{other}' is not one of A, B, C, D")),
        }
    }
}

/// A question as served to the test taker (no answer key).
///
/// The base fields are already localized by the server for the requested
/// language; the `_en`/`_ur` variants let the client switch without a refetch.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Question {
    pub id: i64,
    pub role: Option<String>,
    pub question_text: String,
    pub question_text_en: Option<String>,
    pub question_text_ur: Option<String>,
    pub option_a: String,
    pub option_a_en: Option<String>,
    pub option_a_ur: Option<String>,
    pub option_b: String,
    pub option_b_en: Option<String>,
    pub option_b_ur: Option<String>,
    pub option_c: String,
    pub option_c_en: Option<String>,
    pub option_c_ur: Option<String>,
    pub option_d: String,
    pub option_d_en: Option<String>,
    pub option_d_ur: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct QuestionsResponse {
    pub questions: Vec<Question>,
    #[serde(default)]
    pub language: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubmitTestRequest {
    /// Question id (as a string key) to selected option.
    pub answers: BTreeMap<String, Choice>,
}

/// The server's verdict for one submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestResult {
    pub score: u32,
    pub total: u32,
    pub passed: bool,
    pub attempt_number: u32,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub can_retry: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(default)]
pub struct CertificateInfo {
    pub has_certificate: bool,
    pub name: Option<String>,
    pub role: Option<String>,
    pub score: Option<u32>,
    pub date: Option<String>,
    pub attempt_number: Option<u32>,
    /// Server explanation when no certificate is available.
    #[serde(alias = "error")]
    pub message: Option<String>,
}

impl CertificateInfo {
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(default)]
pub struct AnalyticsTotals {
    pub users: u64,
    pub admins: u64,
    pub tests_taken: u64,
    pub tests_passed: u64,
    pub tests_failed: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(default)]
pub struct RevenueSummary {
    pub total_amount: u64,
    pub discounted_payments: u64,
    pub regular_payments: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RecentPayment {
    pub id: i64,
    pub user: String,
    pub amount: u64,
    pub discounted: bool,
    pub created_at: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(default)]
pub struct Analytics {
    pub totals: AnalyticsTotals,
    pub revenue: RevenueSummary,
    pub passes_by_category: BTreeMap<String, u64>,
    pub recent_payments: Vec<RecentPayment>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AdminUser {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub role: String,
    #[serde(default)]
    pub is_admin: bool,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub attempts_total: u64,
    #[serde(default)]
    pub attempts_passed: u64,
    #[serde(default)]
    pub attempts_failed: u64,
    #[serde(default)]
    pub last_attempt_at: Option<String>,
    #[serde(default)]
    pub payments_total_amount: u64,
    #[serde(default)]
    pub payments_count: u64,
    #[serde(default)]
    pub last_payment_at: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AdminUsersResponse {
    pub users: Vec<AdminUser>,
}

/// Partial update for `PUT admin/users/{id}`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct UserUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_admin: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MessageResponse {
    #[serde(default)]
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attempt_info_derives_remaining_when_missing() {
        let info: AttemptInfo =
            serde_json::from_str(r#"{"attempt_count": 2, "has_passed": false}"#).unwrap();
        assert_eq!(info.remaining_attempts, 1);

        let info: AttemptInfo = serde_json::from_str(r#"{"attempt_count": 5}"#).unwrap();
        assert_eq!(info.remaining_attempts, 0);
        assert!(!info.has_passed);
    }

    #[test]
    fn test_attempt_info_prefers_server_remaining() {
        let info: AttemptInfo = serde_json::from_str(
            r#"{"attempt_count": 1, "remaining_attempts": 7, "has_passed": false}"#,
        )
        .unwrap();
        assert_eq!(info.remaining_attempts, 7);
    }

    #[test]
    fn test_payment_method_wire_names_and_fees() {
        assert_eq!(
            serde_json::to_string(&PaymentMethod::SelfPay).unwrap(),
            r#""self""#
        );
        assert_eq!(
            serde_json::to_string(&PaymentMethod::Facilitator).unwrap(),
            r#""facilitator""#
        );
        assert_eq!(PaymentMethod::SelfPay.amount(), 800);
        assert_eq!(PaymentMethod::Facilitator.amount(), 500);
    }

    #[test]
    fn test_submit_request_shape() {
        let mut answers = BTreeMap::new();
        answers.insert("12".to_string(), Choice::C);
        let body = serde_json::to_value(SubmitTestRequest { answers }).unwrap();
        assert_eq!(body, serde_json::json!({"answers": {"12": "C"}}));
    }

    #[test]
    fn test_certificate_error_body_maps_to_message() {
        let info: CertificateInfo = serde_json::from_str(
            r#"{"error": "No passed attempt found", "has_certificate": false}"#,
        )
        .unwrap();
        assert!(!info.has_certificate);
        assert_eq!(info.message.as_deref(), Some("No passed attempt found"));
    }

    #[test]
    fn test_user_update_skips_unset_fields() {
        let update = UserUpdate {
            role: Some("Electrician".to_string()),
            ..Default::default()
        };
        assert_eq!(
            serde_json::to_value(update).unwrap(),
            serde_json::json!({"role": "Electrician"})
        );
    }

    #[test]
    fn test_language_and_choice_parse() {
        assert_eq!("UR".parse::<Language>().unwrap(), Language::Ur);
        assert_eq!(Language::Ur.toggled(), Language::En);
        assert_eq!("b".parse::<Choice>().unwrap(), Choice::B);
        assert!("e".parse::<Choice>().is_err());
    }
}
