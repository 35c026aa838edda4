use std::sync::Arc;

use tracing::{debug, error, info, warn};

use hostel_shared::utils::{mask_email, mask_phone};

use super::templates::{AllocationNotice, MessageTemplates, PaymentNotice};
use super::{EmailSender, SmsSender};
use crate::domain::{
    Channel, DeliveryError, DispatchReport, MessageStatus, MessageType, NewMessageHistory, NotificationRequest,
};
use crate::repositories::MessageHistoryRepository;

/// Sends a rendered message by email, falling back to SMS.
pub struct NotificationDispatcher {
    email: Option<Arc<dyn EmailSender>>,
    sms: Option<Arc<dyn SmsSender>>,
    history: Arc<dyn MessageHistoryRepository>,
    templates: MessageTemplates,
}

impl NotificationDispatcher {
    /// A `None` sender means the channel is switched off and is skipped
    /// without writing history.
    pub fn new(
        email: Option<Arc<dyn EmailSender>>,
        sms: Option<Arc<dyn SmsSender>>,
        history: Arc<dyn MessageHistoryRepository>,
        templates: MessageTemplates,
    ) -> Self {
        Self { email, sms, history, templates }
    }

    pub async fn allocation_confirmed(&self, notice: &AllocationNotice) -> DispatchReport {
        match self.templates.allocation(notice) {
            Ok(message) => {
                self.dispatch(&NotificationRequest {
                    student_id: notice.student_id,
                    email: notice.email.clone(),
                    phone: notice.phone.clone(),
                    message_type: MessageType::AllocationConfirmation,
                    subject: message.subject,
                    body: message.body,
                })
                .await
            }
            Err(e) => {
                error!("Failed to render allocation notice for student {}: {}", notice.student_id, e);
                DispatchReport::default()
            }
        }
    }

    pub async fn payment_received(&self, notice: &PaymentNotice) -> DispatchReport {
        match self.templates.payment(notice) {
            Ok(message) => {
                self.dispatch(&NotificationRequest {
                    student_id: notice.student_id,
                    email: notice.email.clone(),
                    phone: notice.phone.clone(),
                    message_type: MessageType::PaymentReceipt,
                    subject: message.subject,
                    body: message.body,
                })
                .await
            }
            Err(e) => {
                error!("Failed to render payment receipt for student {}: {}", notice.student_id, e);
                DispatchReport::default()
            }
        }
    }

    pub async fn dispatch(&self, request: &NotificationRequest) -> DispatchReport {
        let mut report = DispatchReport::default();
        let email = request.email.as_deref().map(str::trim).filter(|e| !e.is_empty());
        let phone = request.phone.as_deref().map(str::trim).filter(|p| !p.is_empty());

        if let (Some(address), Some(sender)) = (email, self.email.as_ref()) {
            let result = sender.send(address, &request.subject, &request.body).await;
            self.remember(&mut report, request, Channel::Email, address, &result).await;
            match result {
                Ok(()) => {
                    info!("{} emailed to {}", request.message_type.as_str(), mask_email(address));
                    report.email_sent = true;
                    return report;
                }
                Err(e) => warn!("Email to {} failed, trying SMS: {}", mask_email(address), e),
            }
        }

        if let (Some(number), Some(sender)) = (phone, self.sms.as_ref()) {
            let result = sender.send(number, &request.body).await;
            self.remember(&mut report, request, Channel::Sms, number, &result).await;
            match result {
                Ok(()) => {
                    info!("{} sent by SMS to {}", request.message_type.as_str(), mask_phone(number));
                    report.sms_sent = true;
                }
                Err(e) => warn!("SMS to {} failed: {}", mask_phone(number), e),
            }
        }

        if !report.email_sent && !report.sms_sent && report.history_ids.is_empty() {
            debug!("No usable channel for student {}", request.student_id);
        }
        report
    }

    async fn remember(
        &self,
        report: &mut DispatchReport,
        request: &NotificationRequest,
        channel: Channel,
        recipient: &str,
        result: &Result<(), DeliveryError>,
    ) {
        let entry = NewMessageHistory {
            student_id: request.student_id,
            channel,
            message_type: request.message_type,
            recipient: recipient.to_string(),
            content: request.body.clone(),
            status: if result.is_ok() { MessageStatus::Sent } else { MessageStatus::Failed },
            error: result.as_ref().err().map(|e| e.to_string()),
        };
        match self.history.record(&entry).await {
            Ok(id) => report.history_ids.push(id),
            Err(e) => error!("Failed to record {} message history: {}", channel.as_str(), e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DomainError;
    use crate::repositories::message_history_repository::MockMessageHistoryRepository;
    use crate::services::notification::{MockEmailSender, MockSmsSender};
    use std::sync::atomic::{AtomicI32, Ordering};

    fn request(email: Option<&str>, phone: Option<&str>) -> NotificationRequest {
        NotificationRequest {
            student_id: 1,
            email: email.map(String::from),
            phone: phone.map(String::from),
            message_type: MessageType::PaymentReceipt,
            subject: "Receipt".to_string(),
            body: "Paid".to_string(),
        }
    }

    fn history() -> MockMessageHistoryRepository {
        let next = Arc::new(AtomicI32::new(0));
        let mut repo = MockMessageHistoryRepository::new();
        repo.expect_record()
            .returning(move |_| Ok(next.fetch_add(1, Ordering::SeqCst) + 1));
        repo
    }

    fn dispatcher(email: MockEmailSender, sms: MockSmsSender, history: MockMessageHistoryRepository) -> NotificationDispatcher {
        NotificationDispatcher::new(
            Some(Arc::new(email)),
            Some(Arc::new(sms)),
            Arc::new(history),
            MessageTemplates::new("TZS").unwrap(),
        )
    }

    #[tokio::test]
    async fn email_success_skips_sms() {
        let mut email = MockEmailSender::new();
        email.expect_send().times(1).returning(|_, _, _| Ok(()));
        let mut sms = MockSmsSender::new();
        sms.expect_send().never();

        let report = dispatcher(email, sms, history())
            .dispatch(&request(Some("a@b.com"), Some("0712345678")))
            .await;

        assert!(report.email_sent);
        assert!(!report.sms_sent);
        assert_eq!(report.history_ids, vec![1]);
    }

    #[tokio::test]
    async fn email_failure_falls_back_to_sms() {
        let mut email = MockEmailSender::new();
        email
            .expect_send()
            .returning(|_, _, _| Err(DeliveryError::Transport("smtp down".into())));
        let mut sms = MockSmsSender::new();
        sms.expect_send().times(1).returning(|_, _| Ok(()));

        let report = dispatcher(email, sms, history())
            .dispatch(&request(Some("a@b.com"), Some("0712345678")))
            .await;

        assert!(!report.email_sent);
        assert!(report.sms_sent);
        assert_eq!(report.history_ids.len(), 2);
    }

    #[tokio::test]
    async fn no_email_goes_straight_to_sms() {
        let mut email = MockEmailSender::new();
        email.expect_send().never();
        let mut sms = MockSmsSender::new();
        sms.expect_send().times(1).returning(|_, _| Ok(()));

        let report = dispatcher(email, sms, history())
            .dispatch(&request(None, Some("0712345678")))
            .await;

        assert!(report.sms_sent);
    }

    #[tokio::test]
    async fn failures_are_recorded_but_never_raised() {
        let mut email = MockEmailSender::new();
        email
            .expect_send()
            .returning(|_, _, _| Err(DeliveryError::Rejected("bad address".into())));
        let mut sms = MockSmsSender::new();
        sms.expect_send()
            .returning(|_, _| Err(DeliveryError::Transport("timeout".into())));
        let mut history = MockMessageHistoryRepository::new();
        history
            .expect_record()
            .withf(|entry| entry.status == MessageStatus::Failed && entry.error.is_some())
            .times(2)
            .returning(|_| Ok(5));

        let report = dispatcher(email, sms, history)
            .dispatch(&request(Some("a@b.com"), Some("0712345678")))
            .await;

        assert!(!report.email_sent);
        assert!(!report.sms_sent);
        assert_eq!(report.history_ids, vec![5, 5]);
    }

    #[tokio::test]
    async fn history_store_failure_does_not_hide_delivery() {
        let mut email = MockEmailSender::new();
        email.expect_send().returning(|_, _, _| Ok(()));
        let mut history = MockMessageHistoryRepository::new();
        history
            .expect_record()
            .returning(|_| Err(DomainError::DatabaseError("down".into())));

        let report = dispatcher(email, MockSmsSender::new(), history)
            .dispatch(&request(Some("a@b.com"), None))
            .await;

        assert!(report.email_sent);
        assert!(report.history_ids.is_empty());
    }
}
