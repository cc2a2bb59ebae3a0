use discord_web::prelude::*;

#[tokio::main]
async fn main() {
    let client = ClientBuilder::from_env()
        .and_then(ClientBuilder::build)
        .expect("Expected DISCORD_TOKEN in environment");

    // identify once per bot, not once per run
    match client.identify("identify-demo").await {
        Ok(session) => {
            let name = session.user().and_then(|user| user.name());
            println!(
                "Identified as {} (session {})",
                name.as_deref().unwrap_or("?"),
                session.session_id().unwrap_or("?")
            );
        }
        Err(e) => {
            eprintln!("Gateway error: {}", e);
            return;
        }
    }

    let Ok(channel_id) = std::env::var("DISCORD_CHANNEL") else {
        println!("Set DISCORD_CHANNEL to list its latest messages");
        return;
    };

    let mut channel: Channel = match client.connect(&channel_id).await {
        Ok(channel) => channel,
        Err(e) => {
            eprintln!("Client error: {}", e);
            return;
        }
    };

    match channel.messages(None).await {
        Ok(messages) => {
            for message in messages {
                let author = message.author().and_then(|user| user.name());
                println!(
                    "{}: {}",
                    author.as_deref().unwrap_or("unknown"),
                    message.content().unwrap_or_default()
                );
            }
        }
        Err(e) => eprintln!("Client error: {}", e),
    }
}
