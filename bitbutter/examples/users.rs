use anyhow::{anyhow, Result};
use bitbutter::{Order, PaginationOptions};

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenv::dotenv();
    env_logger::init();

    // Reads BB_ENDPOINT, BB_API_KEY, BB_SECRET, BB_PARTNER_ID and friends.
    let client = bitbutter::default_client()?;
    println!("Using {:?}", client.identity());

    let page = PaginationOptions::new()
        .with_limit(10)
        .with_order(Order::Desc);
    let users = client.get_all_users(Some(page)).await?;
    println!("Users before: {users:#}");

    let created = client.create_user().await?;
    println!("Created: {created:#}");

    let user_id = match &created["user"]["id"] {
        serde_json::Value::String(id) => id.clone(),
        serde_json::Value::Number(id) => id.to_string(),
        other => return Err(anyhow!("create_user returned no user id: {other}")),
    };

    let deleted = client.delete_user(&user_id).await?;
    println!("Deleted {user_id}: {deleted:#}");

    let users = client.get_all_users(Some(page)).await?;
    println!("Users after: {users:#}");

    Ok(())
}
