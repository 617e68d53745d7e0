use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{info, warn};

/// Domain events emitted after successful state changes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    SaleRecorded {
        sale_id: i32,
        total_amount: Decimal,
        line_count: usize,
    },
    SaleLineRemoved {
        sale_id: i32,
        product_id: i32,
        quantity_restored: i32,
    },
    PurchaseOrderCreated {
        purchase_order_id: i32,
        supplier_id: i32,
    },
    PurchaseOrderReceived {
        purchase_order_id: i32,
    },
    StockAdjusted {
        product_id: i32,
        quantity_change: i32,
        new_quantity: i32,
    },
    LowStockAlerted {
        product_count: usize,
        recipient_count: usize,
    },
    UserCreated {
        user_id: i32,
    },
}

/// Cloneable handle for publishing events to the in-process consumer.
#[derive(Debug, Clone)]
pub struct EventSender {
    sender: mpsc::Sender<Event>,
}

impl EventSender {
    pub fn new(sender: mpsc::Sender<Event>) -> Self {
        Self { sender }
    }

    pub async fn send(&self, event: Event) -> Result<(), String> {
        self.sender
            .send(event)
            .await
            .map_err(|e| format!("Failed to send event: {}", e))
    }

    /// Sends an event, logging instead of failing when the consumer is gone.
    /// Event delivery is advisory; it must never fail a request.
    pub async fn send_or_log(&self, event: Event) {
        if let Err(e) = self.send(event).await {
            warn!("Event dropped: {}", e);
        }
    }
}

/// Consumes events and logs them. The original system had no message bus;
/// this task keeps event handling in-process and observable.
pub async fn process_events(mut receiver: mpsc::Receiver<Event>) {
    while let Some(event) = receiver.recv().await {
        match &event {
            Event::SaleRecorded {
                sale_id,
                total_amount,
                line_count,
            } => {
                info!(
                    sale_id,
                    %total_amount,
                    line_count,
                    "Sale recorded"
                );
            }
            Event::PurchaseOrderReceived { purchase_order_id } => {
                info!(purchase_order_id, "Purchase order received");
            }
            Event::StockAdjusted {
                product_id,
                quantity_change,
                new_quantity,
            } => {
                info!(product_id, quantity_change, new_quantity, "Stock adjusted");
            }
            other => {
                info!(event = ?other, "Domain event");
            }
        }
    }
    info!("Event channel closed; consumer exiting");
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[tokio::test]
    async fn send_or_log_does_not_fail_without_consumer() {
        let (tx, rx) = mpsc::channel(1);
        drop(rx);
        let sender = EventSender::new(tx);
        // Must not panic or error out.
        sender
            .send_or_log(Event::SaleRecorded {
                sale_id: 1,
                total_amount: dec!(10.00),
                line_count: 1,
            })
            .await;
    }
}
