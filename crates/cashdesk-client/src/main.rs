//! Cash desk demo client
//!
//! - Loads `cashdesk.yaml` (or `$CASHDESK_CONFIG`)
//! - Logs every server event
//! - Logs in when a `cashier` section is configured
//! - Runs until Ctrl+C

use std::process::ExitCode;

use tracing_subscriber::{fmt, EnvFilter};

use cashdesk_client::{config, CashDeskClient};

#[tokio::main]
async fn main() -> ExitCode {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    let path = std::env::var("CASHDESK_CONFIG").unwrap_or_else(|_| "cashdesk.yaml".into());
    let cfg = match config::load_from_file(&path) {
        Ok(cfg) => cfg,
        Err(e) => {
            tracing::error!(%path, error = %e, "config load failed");
            return ExitCode::FAILURE;
        }
    };

    let client = CashDeskClient::new(cfg.client);
    subscribe_logging(&client);

    tracing::info!(endpoint = %client.config().endpoint, "cashdesk-demo starting");
    if let Err(e) = client.connect().await {
        tracing::error!(error = %e, "connect failed");
        return ExitCode::FAILURE;
    }

    if let Some(cashier) = &cfg.cashier {
        if let Err(e) = client
            .login(&cashier.account_id, &cashier.user_name, &cashier.password)
            .await
        {
            tracing::error!(error = %e, "login failed");
        }
    }

    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "ctrl_c listener failed");
    }

    if let Err(e) = client.dispose().await {
        tracing::warn!(error = %e, "dispose failed");
    }
    ExitCode::SUCCESS
}

fn subscribe_logging(client: &CashDeskClient) {
    client.on_login_succeeded(|p| {
        tracing::info!(
            cashier = %p.cashier.user_name,
            location = %p.cashier.location_name,
            pending_payment = p.pending_payment.is_some(),
            "login succeeded"
        )
    });
    client.on_login_failed(|p| tracing::warn!(code = %p.code, message = %p.message, "login failed"));

    client.on_payment_created(|p| {
        tracing::info!(
            id = %p.payment.id,
            amount = %p.payment.amount,
            currency = %p.payment.currency,
            deep_link = %p.payment_deep_link,
            "payment created"
        )
    });
    client.on_payment_completed(|p| {
        tracing::info!(id = %p.payment.id, status = ?p.payment.status, "payment completed")
    });
    client.on_payment_create_failed(|p| {
        tracing::warn!(code = %p.code, message = %p.message, "payment create failed")
    });

    client.on_cash_in_created(|p| {
        tracing::info!(id = %p.cash_in.id, amount = %p.cash_in.amount, "cash-in created")
    });
    client.on_cash_in_completed(|p| tracing::info!(id = %p.cash_in.id, "cash-in completed"));
    client.on_cash_in_create_failed(|p| {
        tracing::warn!(code = %p.code, message = %p.message, "cash-in create failed")
    });

    client.on_cash_out_created(|p| {
        tracing::info!(id = %p.cash_out.id, amount = %p.cash_out.amount, "cash-out created")
    });
    client.on_cash_out_paid_by_user(|p| tracing::info!(id = %p.cash_out.id, "cash-out paid by user"));
    client.on_cash_out_completed(|p| tracing::info!(id = %p.cash_out.id, "cash-out completed"));
    client.on_cash_out_create_failed(|p| {
        tracing::warn!(code = %p.code, message = %p.message, "cash-out create failed")
    });

    client.on_general_error(|p| tracing::warn!(code = %p.code, message = %p.message, "server error"));
    client.on_connection_closed(|ev| {
        tracing::info!(code = ?ev.code, reason = ?ev.reason, "connection closed")
    });
}
