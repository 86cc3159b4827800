use crate::{cli, info};

pub async fn me() {
    let spotify = cli::client().await;
    let pb = cli::spinner("Fetching profile...");
    let user = spotify.users().current_user().await;
    pb.finish_and_clear();

    let user = user.unwrap_or_else(|e| cli::fail(e));
    info!("Id:      {}", user.id);
    info!("Name:    {}", user.display_name.as_deref().unwrap_or("-"));
    info!("Email:   {}", user.email.as_deref().unwrap_or("-"));
    info!("Country: {}", user.country.as_deref().unwrap_or("-"));
    info!("Product: {}", user.product.as_deref().unwrap_or("-"));
}
