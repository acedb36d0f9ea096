//! Publish a notification from the command line.

use tracing::info;

use crm_portal_core::CustomerId;
use crm_portal_server::db::{self, CustomerStore, PgCustomerStore, PgNotificationStore};
use crm_portal_server::services::{NotificationInput, NotificationService};

/// Create a notification, portal-wide unless `recipient` is given.
///
/// # Errors
///
/// Returns an error if the database URL is missing, the recipient does not
/// exist, or the title or message is blank.
pub async fn run(
    title: String,
    message: String,
    kind: Option<String>,
    recipient: Option<i32>,
) -> Result<(), Box<dyn std::error::Error>> {
    let database_url = super::database_url().map_err(|var| format!("{var} not set"))?;
    let pool = db::create_pool(&database_url).await?;

    let recipient = recipient.map(CustomerId::new);
    if let Some(id) = recipient {
        let customers = PgCustomerStore::new(pool.clone());
        if customers.find_by_id(id).await?.is_none() {
            return Err(format!("Customer {id} not found").into());
        }
    }

    let store = PgNotificationStore::new(pool);
    let input = NotificationInput {
        title: Some(title),
        message: Some(message),
        kind,
    };

    let service = NotificationService::new(&store);
    let notification = service.create(&input, recipient).await?;
    let unread = service.unread_count(recipient).await?;

    info!(
        id = %notification.id,
        scope = if recipient.is_some() { "customer" } else { "global" },
        unread,
        "Notification created"
    );
    Ok(())
}
