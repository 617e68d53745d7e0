use std::sync::Arc;

use futures::future::join_all;
use lettre::{
    message::header::ContentType, transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};
use tracing::{error, info, instrument, warn};

use crate::{
    config::MailConfig,
    db::DbPool,
    entities::{
        employee_profile::{self, Entity as EmployeeProfile, Role},
        product,
        user::Entity as User,
    },
    errors::ServiceError,
    events::{Event, EventSender},
};

struct Mailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: String,
}

/// Low-stock alert mailer. Built from configuration; when no SMTP host is
/// configured the service stays inert and reports that delivery is
/// disabled instead of failing report pages.
#[derive(Clone)]
pub struct NotificationService {
    db: Arc<DbPool>,
    mailer: Option<Arc<Mailer>>,
    event_sender: EventSender,
}

impl NotificationService {
    pub fn from_config(
        db: Arc<DbPool>,
        cfg: &MailConfig,
        event_sender: EventSender,
    ) -> Result<Self, ServiceError> {
        let mailer = match cfg.smtp_host.as_deref() {
            Some(host) => {
                let mut builder = AsyncSmtpTransport::<Tokio1Executor>::relay(host)
                    .map_err(|e| {
                        ServiceError::EmailError(format!("Failed to create SMTP transport: {}", e))
                    })?
                    .port(cfg.smtp_port);

                if let (Some(username), Some(password)) =
                    (cfg.smtp_username.clone(), cfg.smtp_password.clone())
                {
                    builder = builder.credentials(Credentials::new(username, password));
                }

                Some(Arc::new(Mailer {
                    transport: builder.build(),
                    from: format!("{} <{}>", cfg.from_name, cfg.from_email),
                }))
            }
            None => None,
        };

        Ok(Self {
            db,
            mailer,
            event_sender,
        })
    }

    /// Emails every active employee with an Owner or Stock Manager role and
    /// a registered address, listing each low-stock product with its current
    /// stock and reorder level. Returns a status message for the report
    /// page; a send failure is an error the caller reports, never a failed
    /// page render.
    #[instrument(skip(self, products), fields(product_count = products.len()))]
    pub async fn send_low_stock_alert(
        &self,
        products: &[product::Model],
    ) -> Result<String, ServiceError> {
        if products.is_empty() {
            return Ok("No products are low on stock.".to_string());
        }

        let recipients = self.alert_recipients().await?;
        if recipients.is_empty() {
            warn!("Low stock detected but no recipients configured");
            return Ok(
                "No active owners or stock managers with email addresses found to send low stock alerts."
                    .to_string(),
            );
        }

        let Some(mailer) = &self.mailer else {
            return Ok("Email delivery is not configured; no alert sent.".to_string());
        };

        let mut body = String::from("The following products are running low on stock:\n");
        for prod in products {
            body.push_str(&format!(
                "- {} (Current Stock: {}, Reorder Level: {})\n",
                prod.name, prod.stock_quantity, prod.reorder_level
            ));
        }

        let sends = recipients.iter().map(|to| {
            let mailer = mailer.clone();
            let body = body.clone();
            let to = to.clone();
            async move {
                let message = Message::builder()
                    .from(mailer.from.parse().map_err(|e| {
                        ServiceError::EmailError(format!("Invalid from address: {}", e))
                    })?)
                    .to(to.parse().map_err(|e| {
                        ServiceError::EmailError(format!("Invalid recipient address {}: {}", to, e))
                    })?)
                    .subject("Low Stock Alert")
                    .header(ContentType::TEXT_PLAIN)
                    .body(body)
                    .map_err(|e| {
                        ServiceError::EmailError(format!("Failed to build email: {}", e))
                    })?;

                mailer.transport.send(message).await.map_err(|e| {
                    ServiceError::EmailError(format!("Failed to send to {}: {}", to, e))
                })
            }
        });

        let failures: Vec<ServiceError> = join_all(sends)
            .await
            .into_iter()
            .filter_map(Result::err)
            .collect();

        if let Some(first) = failures.into_iter().next() {
            error!("Low stock alert delivery failed: {}", first);
            return Err(first);
        }

        info!(
            recipients = recipients.len(),
            products = products.len(),
            "Low stock alert sent"
        );

        self.event_sender
            .send_or_log(Event::LowStockAlerted {
                product_count: products.len(),
                recipient_count: recipients.len(),
            })
            .await;

        Ok("Low stock alert email sent to relevant personnel.".to_string())
    }

    /// Active Owner / Stock Manager employees with a registered email.
    async fn alert_recipients(&self) -> Result<Vec<String>, ServiceError> {
        let db = &*self.db;

        let rows = EmployeeProfile::find()
            .filter(
                employee_profile::Column::Role.is_in([Role::Owner, Role::StockManager]),
            )
            .filter(employee_profile::Column::IsActiveEmployee.eq(true))
            .find_also_related(User)
            .all(db)
            .await
            .map_err(ServiceError::db_error)?;

        Ok(rows
            .into_iter()
            .filter_map(|(_, account)| account.and_then(|u| u.email))
            .filter(|email| !email.is_empty())
            .collect())
    }
}
