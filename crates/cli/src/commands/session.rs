//! Account commands: signup, verification, login, and logout.

use kedai_storefront::api::types::SignupRequest;
use kedai_storefront::session;
use kedai_storefront::state::Storefront;

use super::{CliError, CommandCart};

/// Register an account. A verification code is emailed by the backend.
pub async fn signup(
    storefront: &Storefront,
    name: &str,
    email: &str,
    phone_number: &str,
    password: &str,
) -> Result<(), CliError> {
    let request = SignupRequest {
        name,
        email,
        phone_number,
        password,
    };
    session::signup(storefront.api(), storefront.storage(), &request).await?;

    println!("Account created. Check {email} for a code, then run `kedai verify`");
    Ok(())
}

/// Confirm an account with its emailed code.
pub async fn verify(storefront: &Storefront, email: &str, code: &str) -> Result<(), CliError> {
    let message = session::verify(storefront.api(), storefront.storage(), email, code).await?;

    println!("{}", message.as_deref().unwrap_or("Account verified"));
    println!("You can now run `kedai login`");
    Ok(())
}

/// Log in, then restore the saved cart.
pub async fn login(storefront: &Storefront, email: &str, password: &str) -> Result<(), CliError> {
    let user = session::login(storefront.api(), storefront.storage(), email, password).await?;

    let name = user.name.as_deref().unwrap_or(email);
    println!("Logged in as {name}");
    if !user.is_profile_complete {
        println!("Your profile is incomplete; finish it on the website before ordering");
    }

    // Hydration mirrors the backend cart into local storage on close
    let cart = CommandCart::open(storefront).await?;
    let lines = cart.cart.len();
    cart.close().await?;

    if lines > 0 {
        println!("Restored {lines} cart line(s)");
    }
    Ok(())
}

/// Fetch the current profile from the backend and print it.
pub async fn profile(storefront: &Storefront) -> Result<(), CliError> {
    let user = match session::refresh_user(storefront.api(), storefront.storage()).await {
        Err(session::SessionError::NotLoggedIn) => return Err(CliError::NotLoggedIn),
        result => result?,
    };

    println!("{:<10} {}", "id", user.id);
    println!("{:<10} {}", "name", user.name.as_deref().unwrap_or("-"));
    println!("{:<10} {}", "email", user.email.as_deref().unwrap_or("-"));
    println!(
        "{:<10} {}",
        "profile",
        if user.is_profile_complete { "complete" } else { "incomplete" }
    );
    Ok(())
}

/// Forget the session locally. The remote cart is kept for next login.
pub async fn logout(storefront: &Storefront) -> Result<(), CliError> {
    session::logout(storefront.storage()).await?;
    println!("Logged out");
    Ok(())
}
