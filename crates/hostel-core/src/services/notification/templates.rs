use handlebars::{Handlebars, RenderError, TemplateError};
use rust_decimal::Decimal;
use serde_json::json;

use hostel_shared::EntityId;

use crate::domain::round_money;

const ALLOCATION_SUBJECT: &str = "allocation_subject";
const ALLOCATION_BODY: &str = "allocation_body";
const PAYMENT_SUBJECT: &str = "payment_subject";
const PAYMENT_BODY: &str = "payment_body";

/// Data for an allocation confirmation. Amounts are display-equivalent.
#[derive(Debug, Clone)]
pub struct AllocationNotice {
    pub student_id: EntityId,
    pub student_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub hostel_name: Option<String>,
    pub room_name: String,
    pub price: Decimal,
}

/// Data for a payment receipt. Amounts are display-equivalent.
#[derive(Debug, Clone)]
pub struct PaymentNotice {
    pub student_id: EntityId,
    pub student_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub payment_id: EntityId,
    pub amount: Decimal,
    pub total_paid: Decimal,
    pub balance: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedMessage {
    pub subject: String,
    pub body: String,
}

/// Plain-text message templates.
pub struct MessageTemplates {
    registry: Handlebars<'static>,
    currency: String,
}

impl MessageTemplates {
    pub fn new(currency: impl Into<String>) -> Result<Self, TemplateError> {
        let mut registry = Handlebars::new();
        registry.set_strict_mode(true);
        registry.register_escape_fn(handlebars::no_escape);
        registry.register_template_string(ALLOCATION_SUBJECT, "Room allocation confirmed")?;
        registry.register_template_string(
            ALLOCATION_BODY,
            "Dear {{student_name}}, you have been allocated room {{room_name}}\
             {{#if hostel_name}} at {{hostel_name}}{{/if}}. \
             Amount payable: {{price}} {{currency}}.",
        )?;
        registry.register_template_string(PAYMENT_SUBJECT, "Payment receipt #{{payment_id}}")?;
        registry.register_template_string(
            PAYMENT_BODY,
            "Dear {{student_name}}, we have received your payment of {{amount}} {{currency}}. \
             Total paid: {{total_paid}} {{currency}}. Balance: {{balance}} {{currency}}.",
        )?;
        Ok(Self {
            registry,
            currency: currency.into(),
        })
    }

    pub fn allocation(&self, notice: &AllocationNotice) -> Result<RenderedMessage, RenderError> {
        let data = json!({
            "student_name": notice.student_name,
            "hostel_name": notice.hostel_name,
            "room_name": notice.room_name,
            "price": format_money(notice.price),
            "currency": self.currency,
        });
        Ok(RenderedMessage {
            subject: self.registry.render(ALLOCATION_SUBJECT, &data)?,
            body: self.registry.render(ALLOCATION_BODY, &data)?,
        })
    }

    pub fn payment(&self, notice: &PaymentNotice) -> Result<RenderedMessage, RenderError> {
        let data = json!({
            "student_name": notice.student_name,
            "payment_id": notice.payment_id,
            "amount": format_money(notice.amount),
            "total_paid": format_money(notice.total_paid),
            "balance": format_money(notice.balance),
            "currency": self.currency,
        });
        Ok(RenderedMessage {
            subject: self.registry.render(PAYMENT_SUBJECT, &data)?,
            body: self.registry.render(PAYMENT_BODY, &data)?,
        })
    }
}

fn format_money(amount: Decimal) -> String {
    format!("{:.2}", round_money(amount))
}
