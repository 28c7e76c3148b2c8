//! CBS client: the public operations of the adapter.
//!
//! Each call runs the same pipeline: envelope, transport, sanitize, parse,
//! extract and classify, normalize. Calls share nothing but the config.

use crate::config::CbsConfig;
use crate::domain::{self, CustomerDetails, SubscriberInfo};
use crate::envelope::{Correlation, EnvelopeBuilder, EnvelopeRequest, Operation};
use crate::error::CbsError;
use crate::parser::{parse_document, sanitize_xml, XmlElement};
use crate::response::extract_result;
use crate::transport::{CorrelationIds, HttpTransport, SoapRequest, Transport, UuidCorrelationIds};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Client for the CBS business manager interface.
pub struct CbsClient {
    config: Arc<CbsConfig>,
    transport: Box<dyn Transport>,
    ids: Box<dyn CorrelationIds>,
}

impl CbsClient {
    /// Create a client talking HTTP to the configured endpoint.
    pub fn new(config: Arc<CbsConfig>) -> Result<Self, CbsError> {
        config.validate()?;
        let transport = HttpTransport::new(&config)?;
        Ok(Self::with_transport(
            config,
            Box::new(transport),
            Box::new(UuidCorrelationIds),
        ))
    }

    /// Create a client with explicit collaborators.
    pub fn with_transport(
        config: Arc<CbsConfig>,
        transport: Box<dyn Transport>,
        ids: Box<dyn CorrelationIds>,
    ) -> Self {
        Self {
            config,
            transport,
            ids,
        }
    }

    pub fn config(&self) -> &CbsConfig {
        &self.config
    }

    /// Query lifecycle state, payment mode and activation of a subscriber.
    pub async fn enquiry(&self, request_id: &str, msisdn: &str) -> Result<SubscriberInfo, CbsError> {
        let correlation = Correlation::reuse(request_id);
        let request = EnvelopeRequest::IntegrationEnquiry {
            subscriber_no: msisdn,
        };
        let document = self.call(&correlation, &request).await?;
        let result_msg = self.extract(&correlation, &document, request.operation())?;
        let info = domain::subscriber_info(result_msg)?;

        debug!(
            request_id = %correlation.request_id,
            state = %info.state,
            payment_mode = %info.payment_mode,
            "Subscriber enquiry completed"
        );
        Ok(info)
    }

    /// Look up the customer name behind a subscriber.
    pub async fn customer_details(
        &self,
        request_id: &str,
        msisdn: &str,
    ) -> Result<CustomerDetails, CbsError> {
        let correlation = Correlation::reuse(request_id);
        let request = EnvelopeRequest::QueryBasicInfo {
            subscriber_no: msisdn,
        };
        let document = self.call(&correlation, &request).await?;
        let result_msg = self.extract(&correlation, &document, request.operation())?;
        domain::customer_details(result_msg)
    }

    /// Create a new subscriber for `msisdn` on behalf of `agent_id`.
    pub async fn create_number(
        &self,
        request_id: &str,
        msisdn: &str,
        agent_id: &str,
    ) -> Result<(), CbsError> {
        let correlation = Correlation::fresh(request_id, &*self.ids);
        let request = EnvelopeRequest::NewSubscriber {
            subscriber_no: msisdn,
            agent_id,
        };
        let document = self.call(&correlation, &request).await?;
        self.extract(&correlation, &document, request.operation())?;

        info!(
            request_id = %correlation.request_id,
            serial_no = %correlation.serial_no,
            agent_id = %agent_id,
            "Subscriber created"
        );
        Ok(())
    }

    /// Send the envelope and parse the sanitized response.
    async fn call(
        &self,
        correlation: &Correlation,
        request: &EnvelopeRequest<'_>,
    ) -> Result<XmlElement, CbsError> {
        let operation = request.operation();
        let body = EnvelopeBuilder::new(&self.config).build(&correlation.serial_no, request);

        debug!(
            request_id = %correlation.request_id,
            serial_no = %correlation.serial_no,
            operation = %operation,
            "Sending CBS request"
        );

        let raw = self
            .transport
            .send(SoapRequest::new(&self.config, operation, body))
            .await
            .map_err(|e| {
                warn!(
                    request_id = %correlation.request_id,
                    operation = %operation,
                    error = %e,
                    "CBS transport failed"
                );
                e
            })?;

        parse_document(&sanitize_xml(&raw))
    }

    fn extract<'a>(
        &self,
        correlation: &Correlation,
        document: &'a XmlElement,
        operation: Operation,
    ) -> Result<&'a XmlElement, CbsError> {
        extract_result(document, operation, &self.config.settings.busy_marker).map_err(|e| {
            if let Some(classified) = e.classified() {
                warn!(
                    request_id = %correlation.request_id,
                    operation = %operation,
                    class = classified.class.as_str(),
                    status = classified.status_code(),
                    message = %classified.message,
                    "CBS call not successful"
                );
            }
            e
        })
    }
}
