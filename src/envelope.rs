//! Request envelopes for the CBS business manager interface.

use crate::config::CbsConfig;
use crate::error::xml_escape;
use crate::transport::CorrelationIds;

/// Namespace URIs declared on every request envelope.
pub const SOAPENV_NS: &str = "http://schemas.xmlsoap.org/soap/envelope/";
pub const BUSINESS_MSG_NS: &str = "http://www.huawei.com/bme/cbsinterface/cbs/businessmgrmsg";
pub const COMMON_NS: &str = "http://www.huawei.com/bme/cbsinterface/common";
pub const BUSINESS_NS: &str = "http://www.huawei.com/bme/cbsinterface/cbs/businessmgr";

/// CBS operations issued by the adapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    /// Subscriber state enquiry
    IntegrationEnquiry,
    /// Basic customer info lookup
    QueryBasicInfo,
    /// New subscriber (number) creation
    NewSubscriber,
}

impl Operation {
    /// SOAPAction header value, also the CommandId.
    pub fn soap_action(&self) -> &'static str {
        match self {
            Self::IntegrationEnquiry => "IntegrationEnquiry",
            Self::QueryBasicInfo => "QueryBasicInfo",
            Self::NewSubscriber => "NewSubscriber",
        }
    }

    /// Request message element.
    pub fn request_message(&self) -> &'static str {
        match self {
            Self::IntegrationEnquiry => "IntegrationEnquiryRequestMsg",
            Self::QueryBasicInfo => "QueryBasicInfoRequestMsg",
            Self::NewSubscriber => "NewSubscriberRequestMsg",
        }
    }

    /// Response message element inside the SOAP body.
    pub fn result_message(&self) -> &'static str {
        match self {
            Self::IntegrationEnquiry => "IntegrationEnquiryResultMsg",
            Self::QueryBasicInfo => "QueryBasicInfoResultMsg",
            Self::NewSubscriber => "NewSubscriberResultMsg",
        }
    }

    /// Operation-specific result block inside the response message.
    pub fn result_block(&self) -> &'static str {
        match self {
            Self::IntegrationEnquiry => "IntegrationEnquiryResult",
            Self::QueryBasicInfo => "QueryBasicInfoResult",
            Self::NewSubscriber => "NewSubscriberResult",
        }
    }
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.soap_action())
    }
}

/// Parameters of a single request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnvelopeRequest<'a> {
    IntegrationEnquiry { subscriber_no: &'a str },
    QueryBasicInfo { subscriber_no: &'a str },
    NewSubscriber { subscriber_no: &'a str, agent_id: &'a str },
}

impl EnvelopeRequest<'_> {
    pub fn operation(&self) -> Operation {
        match self {
            Self::IntegrationEnquiry { .. } => Operation::IntegrationEnquiry,
            Self::QueryBasicInfo { .. } => Operation::QueryBasicInfo,
            Self::NewSubscriber { .. } => Operation::NewSubscriber,
        }
    }
}

/// Identifiers of one call.
///
/// `serial_no` is what CBS sees in the request header. It equals the caller's
/// `request_id` except for NewSubscriber, where CBS requires a fresh serial.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Correlation {
    pub request_id: String,
    pub serial_no: String,
}

impl Correlation {
    /// Use the caller's request ID as serial number.
    pub fn reuse(request_id: &str) -> Self {
        Self {
            request_id: request_id.to_string(),
            serial_no: request_id.to_string(),
        }
    }

    /// Generate a fresh serial number for this call.
    pub fn fresh(request_id: &str, ids: &dyn CorrelationIds) -> Self {
        Self {
            request_id: request_id.to_string(),
            serial_no: ids.next_id(),
        }
    }
}

/// Renders request envelopes with the configured session entity.
#[derive(Debug, Clone, Copy)]
pub struct EnvelopeBuilder<'a> {
    config: &'a CbsConfig,
}

impl<'a> EnvelopeBuilder<'a> {
    pub fn new(config: &'a CbsConfig) -> Self {
        Self { config }
    }

    /// Build the request body. Parameters are escaped, never validated.
    pub fn build(&self, serial_no: &str, request: &EnvelopeRequest<'_>) -> String {
        let operation = request.operation();
        let remark = match request {
            EnvelopeRequest::NewSubscriber { agent_id, .. } => format!(
                "\n        <com:Remark>{}</com:Remark>",
                xml_escape(&format!("{}{}", self.config.new_subscriber.remark_prefix, agent_id))
            ),
            _ => String::new(),
        };

        format!(
            r#"<soapenv:Envelope xmlns:soapenv="{soapenv}" xmlns:bus="{bus}" xmlns:com="{com}" xmlns:bus1="{bus1}">
  <soapenv:Header/>
  <soapenv:Body>
    <bus:{message}>
      <RequestHeader>
        <com:CommandId>{command}</com:CommandId>
        <com:Version>1</com:Version>
        <com:TransactionId></com:TransactionId>
        <com:SequenceId>1</com:SequenceId>
        <com:RequestType>Event</com:RequestType>
        <com:SessionEntity>
          <com:Name>{name}</com:Name>
          <com:Password>{password}</com:Password>
          <com:RemoteAddress></com:RemoteAddress>
        </com:SessionEntity>
        <com:SerialNo>{serial}</com:SerialNo>{remark}
      </RequestHeader>
{body}
    </bus:{message}>
  </soapenv:Body>
</soapenv:Envelope>"#,
            soapenv = SOAPENV_NS,
            bus = BUSINESS_MSG_NS,
            com = COMMON_NS,
            bus1 = BUSINESS_NS,
            message = operation.request_message(),
            command = operation.soap_action(),
            name = xml_escape(&self.config.credentials.name),
            password = xml_escape(&self.config.credentials.password),
            serial = xml_escape(serial_no),
            remark = remark,
            body = self.operation_body(request),
        )
    }

    fn operation_body(&self, request: &EnvelopeRequest<'_>) -> String {
        match request {
            EnvelopeRequest::IntegrationEnquiry { subscriber_no } => {
                query_body("IntegrationEnquiryRequest", subscriber_no, 0)
            }
            EnvelopeRequest::QueryBasicInfo { subscriber_no } => {
                query_body("QueryBasicInfoRequest", subscriber_no, 1)
            }
            EnvelopeRequest::NewSubscriber { subscriber_no, .. } => {
                let template = &self.config.new_subscriber;
                format!(
                    r#"      <NewSubscriberRequest>
        <bus1:SubscriberNo>{}</bus1:SubscriberNo>
        <bus1:Subscriber>
          <bus1:Lang>{}</bus1:Lang>
          <bus1:PaidMode>{}</bus1:PaidMode>
          <bus1:MainProductID>{}</bus1:MainProductID>
        </bus1:Subscriber>
      </NewSubscriberRequest>"#,
                    xml_escape(subscriber_no),
                    xml_escape(&template.lang),
                    xml_escape(&template.paid_mode),
                    xml_escape(&template.main_product_id),
                )
            }
        }
    }
}

fn query_body(element: &str, subscriber_no: &str, query_type: u8) -> String {
    format!(
        r#"      <{element}>
        <bus1:SubscriberNo>{}</bus1:SubscriberNo>
        <bus1:QueryType>{}</bus1:QueryType>
      </{element}>"#,
        xml_escape(subscriber_no),
        query_type,
    )
}
