//! Normalization of CBS codes into domain values.

use crate::error::CbsError;
use crate::parser::{XmlElement, XmlValue};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Activation year reported when it does not apply.
pub const NO_ACTIVATION_YEAR: &str = "0";

/// Subscriber payment mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PaymentMode {
    Prepaid,
    Postpaid,
    Hybrid,
    Undefined,
}

impl PaymentMode {
    /// Map a CBS `PaidMode` code.
    pub fn from_code(code: &str) -> Self {
        match code {
            "0" => Self::Prepaid,
            "1" => Self::Postpaid,
            "2" => Self::Hybrid,
            _ => Self::Undefined,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Prepaid => "PREPAID",
            Self::Postpaid => "POSTPAID",
            Self::Hybrid => "HYBRID",
            Self::Undefined => "UNDEFINED",
        }
    }
}

impl fmt::Display for PaymentMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Subscriber lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LifecycleState {
    Idle,
    Active,
    Suspend,
    Disabled,
    Pool,
    Undefined,
}

impl LifecycleState {
    /// CBS code of the idle state.
    pub const IDLE_CODE: &'static str = "1";

    /// Map a CBS `LifeCycleState` code.
    pub fn from_code(code: &str) -> Self {
        match code {
            "1" => Self::Idle,
            "2" => Self::Active,
            "3" => Self::Suspend,
            "4" => Self::Disabled,
            "5" => Self::Pool,
            _ => Self::Undefined,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "IDLE",
            Self::Active => "ACTIVE",
            Self::Suspend => "SUSPEND",
            Self::Disabled => "DISABLED",
            Self::Pool => "POOL",
            Self::Undefined => "UNDEFINED",
        }
    }
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of a subscriber enquiry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriberInfo {
    /// Lifecycle state
    pub state: LifecycleState,
    /// Raw `LifeCycleState` code
    pub state_code: String,
    /// Payment mode
    pub payment_mode: PaymentMode,
    /// Raw `PaidMode` code
    pub payment_mode_code: String,
    /// First activation date as reported, or "0"
    pub activation_year: String,
}

/// Result of a basic-info lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerDetails {
    pub customer_name: String,
}

/// Activation year for a subscriber in `state_code`.
///
/// "0" for idle subscribers and whenever CBS did not send a plain text value.
pub fn activation_year(state_code: &str, raw: Option<&XmlValue>) -> String {
    if state_code == LifecycleState::IDLE_CODE {
        return NO_ACTIVATION_YEAR.to_string();
    }
    raw.and_then(XmlValue::as_str)
        .unwrap_or(NO_ACTIVATION_YEAR)
        .to_string()
}

/// Normalize an `IntegrationEnquiryResultMsg`.
pub fn subscriber_info(result_msg: &XmlElement) -> Result<SubscriberInfo, CbsError> {
    let result = result_msg
        .element_at(&["IntegrationEnquiryResult"])
        .ok_or_else(|| CbsError::UnexpectedResponse("missing IntegrationEnquiryResult".to_string()))?;

    let state_code = result
        .text_at(&["SubscriberState", "LifeCycleState"])
        .unwrap_or_default()
        .to_string();
    let payment_mode_code = result
        .text_at(&["SubscriberInfo", "Subscriber", "PaidMode"])
        .unwrap_or_default()
        .to_string();
    let activation_year = activation_year(
        &state_code,
        result.path(&["SubscriberState", "FirstActiveDate"]),
    );

    Ok(SubscriberInfo {
        state: LifecycleState::from_code(&state_code),
        payment_mode: PaymentMode::from_code(&payment_mode_code),
        state_code,
        payment_mode_code,
        activation_year,
    })
}

/// Normalize a `QueryBasicInfoResultMsg`.
pub fn customer_details(result_msg: &XmlElement) -> Result<CustomerDetails, CbsError> {
    let name = result_msg
        .text_at(&["QueryBasicInfoResult", "Customer", "Name"])
        .ok_or_else(|| {
            CbsError::UnexpectedResponse("missing QueryBasicInfoResult/Customer/Name".to_string())
        })?;
    Ok(CustomerDetails {
        customer_name: name.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_document;

    fn enquiry_result(state: &str, paid_mode: &str, first_active: &str) -> XmlElement {
        let xml = format!(
            r#"<IntegrationEnquiryResultMsg>
  <IntegrationEnquiryResult>
    <SubscriberInfo><Subscriber><PaidMode>{}</PaidMode></Subscriber></SubscriberInfo>
    <SubscriberState>
      <LifeCycleState>{}</LifeCycleState>
      {}
    </SubscriberState>
  </IntegrationEnquiryResult>
</IntegrationEnquiryResultMsg>"#,
            paid_mode, state, first_active
        );
        let doc = parse_document(&xml).unwrap();
        doc.element_at(&["IntegrationEnquiryResultMsg"]).unwrap().clone()
    }

    #[test]
    fn test_payment_mode_table() {
        assert_eq!(PaymentMode::from_code("0"), PaymentMode::Prepaid);
        assert_eq!(PaymentMode::from_code("1"), PaymentMode::Postpaid);
        assert_eq!(PaymentMode::from_code("2"), PaymentMode::Hybrid);
        assert_eq!(PaymentMode::from_code("3"), PaymentMode::Undefined);
        assert_eq!(PaymentMode::from_code(""), PaymentMode::Undefined);
    }

    #[test]
    fn test_lifecycle_table() {
        let expected = [
            ("1", LifecycleState::Idle),
            ("2", LifecycleState::Active),
            ("3", LifecycleState::Suspend),
            ("4", LifecycleState::Disabled),
            ("5", LifecycleState::Pool),
            ("6", LifecycleState::Undefined),
            ("x", LifecycleState::Undefined),
        ];
        for (code, state) in expected {
            assert_eq!(LifecycleState::from_code(code), state, "code {}", code);
        }
    }

    #[test]
    fn test_labels_serialize_upper_case() {
        assert_eq!(serde_json::to_string(&PaymentMode::Hybrid).unwrap(), "\"HYBRID\"");
        assert_eq!(serde_json::to_string(&LifecycleState::Pool).unwrap(), "\"POOL\"");
        assert_eq!(LifecycleState::Suspend.to_string(), "SUSPEND");
    }

    #[test]
    fn test_activation_year() {
        let raw = XmlValue::Text("2020".to_string());
        assert_eq!(activation_year("2", Some(&raw)), "2020");
        assert_eq!(activation_year("1", Some(&raw)), "0");
        assert_eq!(activation_year("2", None), "0");

        let structured = XmlValue::Element(XmlElement::default());
        assert_eq!(activation_year("2", Some(&structured)), "0");
    }

    #[test]
    fn test_subscriber_info_active() {
        let msg = enquiry_result("2", "1", "<FirstActiveDate>20200115093000</FirstActiveDate>");
        let info = subscriber_info(&msg).unwrap();
        assert_eq!(info.state, LifecycleState::Active);
        assert_eq!(info.state_code, "2");
        assert_eq!(info.payment_mode, PaymentMode::Postpaid);
        assert_eq!(info.payment_mode_code, "1");
        assert_eq!(info.activation_year, "20200115093000");
    }

    #[test]
    fn test_subscriber_info_idle_forces_sentinel() {
        let msg = enquiry_result("1", "0", "<FirstActiveDate>2020</FirstActiveDate>");
        let info = subscriber_info(&msg).unwrap();
        assert_eq!(info.state, LifecycleState::Idle);
        assert_eq!(info.activation_year, "0");
    }

    #[test]
    fn test_subscriber_info_nil_activation() {
        let msg = enquiry_result("2", "0", r#"<FirstActiveDate xsi:nil="true"/>"#);
        let info = subscriber_info(&msg).unwrap();
        assert_eq!(info.activation_year, "0");

        let msg = enquiry_result("2", "0", "");
        assert_eq!(subscriber_info(&msg).unwrap().activation_year, "0");
    }

    #[test]
    fn test_subscriber_info_missing_result() {
        let doc = parse_document("<IntegrationEnquiryResultMsg><ResultHeader/></IntegrationEnquiryResultMsg>")
            .unwrap();
        let msg = doc.element_at(&["IntegrationEnquiryResultMsg"]).unwrap();
        assert!(matches!(subscriber_info(msg), Err(CbsError::UnexpectedResponse(_))));
    }

    #[test]
    fn test_customer_details() {
        let doc = parse_document(
            "<Msg><QueryBasicInfoResult><Customer><Name>Ama Mensah</Name></Customer></QueryBasicInfoResult></Msg>",
        )
        .unwrap();
        let msg = doc.element_at(&["Msg"]).unwrap();
        assert_eq!(customer_details(msg).unwrap().customer_name, "Ama Mensah");
    }

    #[test]
    fn test_customer_details_missing_name() {
        let doc = parse_document("<Msg><QueryBasicInfoResult><Customer/></QueryBasicInfoResult></Msg>")
            .unwrap();
        let msg = doc.element_at(&["Msg"]).unwrap();
        assert!(matches!(customer_details(msg), Err(CbsError::UnexpectedResponse(_))));
    }
}
