use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use tracing::debug;

use artfusion::prelude::*;
use artfusion::store::Collection;
use artfusion::validation::parse_datetime_local;
use artfusion::views::{self, ArtworkCard, CommentThread, EventCard, ReservationRow, WorkshopCard};

#[derive(Parser)]
#[command(name = "artfusion")]
#[command(about = "Browse and manage the ArtFusion gallery", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Backend base address
    #[arg(long, env = "ARTFUSION_API_URL")]
    api_url: Option<String>,

    /// Where the session is kept between runs
    #[arg(long, env = "ARTFUSION_SESSION_FILE")]
    session_file: Option<PathBuf>,

    /// Request timeout in seconds (0 disables it)
    #[arg(long, env = "ARTFUSION_TIMEOUT_SECS")]
    timeout: Option<u64>,

    /// Keep the session in memory only
    #[arg(long)]
    ephemeral: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "warn", env = "LOG_LEVEL")]
    log_level: String,

    /// Enable JSON logging
    #[arg(long, env = "JSON_LOGS")]
    json_logs: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign in
    Login {
        email: String,
        #[arg(long, env = "ARTFUSION_PASSWORD")]
        password: String,
    },
    /// Create an account
    Register {
        email: String,
        #[arg(long)]
        password: String,
        #[arg(long)]
        first_name: String,
        #[arg(long)]
        last_name: String,
        #[arg(long, default_value = "")]
        phone: String,
        /// Artist or Visiteur
        #[arg(long, default_value = "Visiteur")]
        role: Role,
        #[arg(long)]
        nickname: Option<String>,
    },
    /// Forget the stored session
    Logout,
    /// Show the signed-in user
    Whoami,
    /// Reset a forgotten password
    ForgotPassword {
        #[command(subcommand)]
        command: ResetCommand,
    },
    Events {
        #[command(subcommand)]
        command: EventCommand,
    },
    Workshops {
        #[command(subcommand)]
        command: WorkshopCommand,
    },
    Artworks {
        #[command(subcommand)]
        command: ArtworkCommand,
    },
    /// Reserve an artwork
    Reserve {
        artwork: Id,
        #[arg(long)]
        full_name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        phone: String,
        #[arg(long)]
        address: String,
        #[arg(long, default_value_t = 1)]
        quantity: i64,
        #[arg(long)]
        notes: Option<String>,
    },
    Reservations {
        #[command(subcommand)]
        command: ReservationCommand,
    },
    Comments {
        #[command(subcommand)]
        command: CommentCommand,
    },
    /// Suggest artistic nicknames
    Usernames { first_name: String, last_name: String },
    /// Ask the gallery assistant
    Chat { message: String },
}

#[derive(Subcommand)]
enum ResetCommand {
    /// Email a reset code
    Request { email: String },
    /// Set a new password with the emailed code
    Confirm {
        token: String,
        #[arg(long)]
        password: String,
    },
}

/// Listing fields; on update only the given ones change
#[derive(Args)]
struct ListingArgs {
    #[arg(long)]
    title: Option<String>,
    #[arg(long)]
    description: Option<String>,
    /// e.g. 2025-06-01T18:00
    #[arg(long)]
    start: Option<String>,
    #[arg(long)]
    end: Option<String>,
    #[arg(long)]
    location: Option<String>,
    #[arg(long)]
    capacity: Option<i64>,
    #[arg(long)]
    price: Option<String>,
    #[arg(long)]
    image: Option<PathBuf>,
}

#[derive(Args)]
struct WorkshopArgs {
    #[command(flatten)]
    listing: ListingArgs,
    #[arg(long)]
    level: Option<Level>,
    /// [D ]HH:MM:SS
    #[arg(long)]
    duration: Option<String>,
    #[arg(long)]
    materials: Option<String>,
    #[arg(long)]
    instructor: Option<String>,
}

#[derive(Args)]
struct ArtworkArgs {
    #[arg(long)]
    title: Option<String>,
    #[arg(long)]
    description: Option<String>,
    #[arg(long)]
    quantity: Option<i64>,
    #[arg(long)]
    price: Option<String>,
    #[arg(long)]
    image: Option<PathBuf>,
}

#[derive(Subcommand)]
enum EventCommand {
    List,
    Create(ListingArgs),
    Update {
        id: Id,
        #[command(flatten)]
        fields: ListingArgs,
    },
    Delete { id: Id },
    Rate {
        id: Id,
        value: u8,
        #[arg(long, default_value = "")]
        comment: String,
    },
}

#[derive(Subcommand)]
enum WorkshopCommand {
    List,
    Create(WorkshopArgs),
    Update {
        id: Id,
        #[command(flatten)]
        fields: WorkshopArgs,
    },
    Delete { id: Id },
    /// AI summary of a workshop
    Summary { id: Id },
}

#[derive(Subcommand)]
enum ArtworkCommand {
    List,
    Create(ArtworkArgs),
    Update {
        id: Id,
        #[command(flatten)]
        fields: ArtworkArgs,
    },
    Delete { id: Id },
    /// Extract the dominant colors
    Analyze { id: Id },
    /// Draft a description with the AI helper
    Describe {
        title: String,
        #[arg(long, default_value = "")]
        keywords: String,
    },
}

#[derive(Subcommand)]
enum ReservationCommand {
    List,
    Status { id: Id, status: ReservationStatus },
    Delete { id: Id },
}

#[derive(Subcommand)]
enum CommentCommand {
    List {
        #[arg(long)]
        artwork: Option<Id>,
    },
    Post { artwork: Id, content: String },
    Edit { id: Id, content: String },
    Delete { id: Id },
    Moderate {
        id: Id,
        status: ModerationStatus,
        #[arg(long)]
        reason: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_logging(&cli.log_level, cli.json_logs)?;

    let options = client_options(&cli)?;
    debug!(api_url = %options.api_url, "Starting artfusion v{}", env!("CARGO_PKG_VERSION"));
    let gallery = Gallery::new(options)
        .await
        .context("failed to initialize the client")?;

    if let Err(e) = run(&gallery, cli.command).await {
        if let Some(fields) = e.field_errors() {
            for (field, messages) in fields.iter() {
                eprintln!("  {}: {}", field, messages.join(" "));
            }
        }
        return Err(e.into());
    }

    Ok(())
}

fn init_logging(level: &str, json: bool) -> anyhow::Result<()> {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let fmt_layer = if json {
        fmt::layer()
            .json()
            .with_current_span(false)
            .with_writer(std::io::stderr)
            .boxed()
    } else {
        fmt::layer()
            .with_target(false)
            .with_writer(std::io::stderr)
            .boxed()
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();

    Ok(())
}

fn client_options(cli: &Cli) -> anyhow::Result<ClientOptions> {
    let mut options = ClientOptions::from_env()?;
    if let Some(url) = &cli.api_url {
        options = options.with_api_url(url);
    }
    if let Some(path) = &cli.session_file {
        options = options.with_session_file(path.clone());
    }
    if let Some(secs) = cli.timeout {
        options = options.with_request_timeout((secs > 0).then(|| Duration::from_secs(secs)));
    }
    if cli.ephemeral {
        options = options.with_persist_session(false);
    }
    Ok(options)
}

async fn run(gallery: &Gallery, command: Commands) -> Result<()> {
    match command {
        Commands::Login { email, password } => {
            let user = gallery
                .auth()
                .login(&LoginCredentials::new(&email, &password))
                .await?;
            println!("Signed in as {} ({})", user.display_name(), user.category);
        }
        Commands::Register {
            email,
            password,
            first_name,
            last_name,
            phone,
            role,
            nickname,
        } => {
            let draft = SignupDraft {
                email,
                confirm_password: password.clone(),
                password,
                first_name,
                last_name,
                phone,
                category: role,
                artistic_nickname: nickname,
            };
            match gallery.auth().register(&draft).await? {
                Some(user) if gallery.session().is_authenticated() => {
                    println!("Account created, signed in as {}", user.display_name())
                }
                _ => println!("Account created, you can now log in"),
            }
        }
        Commands::Logout => {
            gallery.auth().logout().await?;
            println!("Signed out");
        }
        Commands::Whoami => {
            if gallery.session().is_authenticated() {
                let user = gallery.auth().fetch_profile().await?;
                println!("{} <{}>", user.display_name(), user.email);
                println!("role: {}", user.category);
            } else {
                println!("anonymous");
            }
        }
        Commands::ForgotPassword { command } => match command {
            ResetCommand::Request { email } => {
                let ack = gallery
                    .auth()
                    .forgot_password_request(&PasswordResetRequest { email })
                    .await?;
                println!("{}", ack.message.unwrap_or_else(|| "Reset code sent".to_string()));
            }
            ResetCommand::Confirm { token, password } => {
                let confirm = PasswordResetConfirm {
                    token,
                    confirm_password: password.clone(),
                    new_password: password,
                };
                let ack = gallery.auth().forgot_password_confirm(&confirm).await?;
                println!("{}", ack.message.unwrap_or_else(|| "Password updated".to_string()));
            }
        },
        Commands::Events { command } => events(gallery, command).await?,
        Commands::Workshops { command } => workshops(gallery, command).await?,
        Commands::Artworks { command } => artworks(gallery, command).await?,
        Commands::Reserve {
            artwork,
            full_name,
            email,
            phone,
            address,
            quantity,
            notes,
        } => {
            let artwork = gallery.artworks().get(artwork).await?;
            let draft = ReservationDraft {
                full_name,
                email,
                phone,
                address,
                quantity,
                notes,
            };
            let reservation = gallery.reservations().create(&artwork, &draft).await?;
            println!(
                "Reservation #{} for {} x '{}' is {}",
                reservation.id, reservation.quantity, artwork.title, reservation.status
            );
        }
        Commands::Reservations { command } => reservations(gallery, command).await?,
        Commands::Comments { command } => comments(gallery, command).await?,
        Commands::Usernames {
            first_name,
            last_name,
        } => {
            for name in gallery.ai().username_suggestions(&first_name, &last_name).await? {
                println!("{}", name);
            }
        }
        Commands::Chat { message } => println!("{}", gallery.ai().chat(&message).await?),
    }
    Ok(())
}

fn print_toolbar(viewer: &Viewer, collection: Collection) {
    let controls = views::toolbar(viewer, collection);
    if !controls.is_empty() {
        let labels: Vec<&str> = controls.iter().map(Control::label).collect();
        println!("available: {}", labels.join(", "));
    }
}

#[allow(clippy::too_many_arguments)]
fn apply_listing(
    fields: ListingArgs,
    title: &mut String,
    description: &mut String,
    start: &mut Option<chrono::NaiveDateTime>,
    end: &mut Option<chrono::NaiveDateTime>,
    location: &mut String,
    capacity: &mut i64,
    price: &mut String,
) -> Result<Option<PathBuf>> {
    if let Some(value) = fields.title {
        *title = value;
    }
    if let Some(value) = fields.description {
        *description = value;
    }
    if let Some(value) = fields.start {
        *start = Some(parse_datetime_local(&value)?);
    }
    if let Some(value) = fields.end {
        *end = Some(parse_datetime_local(&value)?);
    }
    if let Some(value) = fields.location {
        *location = value;
    }
    if let Some(value) = fields.capacity {
        *capacity = value;
    }
    if let Some(value) = fields.price {
        *price = value;
    }
    Ok(fields.image)
}

async fn event_draft(mut draft: EventDraft, fields: ListingArgs) -> Result<EventDraft> {
    let image = apply_listing(
        fields,
        &mut draft.title,
        &mut draft.description,
        &mut draft.start_date,
        &mut draft.end_date,
        &mut draft.location,
        &mut draft.capacity,
        &mut draft.price,
    )?;
    if let Some(path) = image {
        draft.image = Some(ImageUpload::from_path(path).await?);
    }
    Ok(draft)
}

async fn workshop_draft(mut draft: WorkshopDraft, fields: WorkshopArgs) -> Result<WorkshopDraft> {
    let image = apply_listing(
        fields.listing,
        &mut draft.title,
        &mut draft.description,
        &mut draft.start_date,
        &mut draft.end_date,
        &mut draft.location,
        &mut draft.capacity,
        &mut draft.price,
    )?;
    if let Some(level) = fields.level {
        draft.level = level;
    }
    if let Some(duration) = fields.duration {
        draft.duration = duration;
    }
    if let Some(materials) = fields.materials {
        draft.materials_provided = materials;
    }
    if let Some(instructor) = fields.instructor {
        draft.instructor = instructor;
    }
    if let Some(path) = image {
        draft.image = Some(ImageUpload::from_path(path).await?);
    }
    Ok(draft)
}

async fn artwork_draft(mut draft: ArtworkDraft, fields: ArtworkArgs) -> Result<ArtworkDraft> {
    if let Some(title) = fields.title {
        draft.title = title;
    }
    if let Some(description) = fields.description {
        draft.description = description;
    }
    if let Some(quantity) = fields.quantity {
        draft.quantity_available = quantity;
    }
    if let Some(price) = fields.price {
        draft.price = price;
    }
    if let Some(path) = fields.image {
        draft.image = Some(ImageUpload::from_path(path).await?);
    }
    Ok(draft)
}

async fn events(gallery: &Gallery, command: EventCommand) -> Result<()> {
    let client = gallery.events();
    match command {
        EventCommand::List => {
            let viewer = gallery.resolve_viewer().await?;
            let cards: Vec<EventCard> = client
                .list()
                .await?
                .into_iter()
                .map(|event| EventCard::new(event, &viewer))
                .collect();
            println!("{}", views::render_events(&cards));
            print_toolbar(&viewer, Collection::Events);
        }
        EventCommand::Create(fields) => {
            let draft = event_draft(EventDraft::default(), fields).await?;
            let event = client.create(&draft).await?;
            println!("Created event #{} '{}'", event.id, event.title);
        }
        EventCommand::Update { id, fields } => {
            let current = client.get(id).await?;
            let draft = event_draft(EventDraft::from_event(&current), fields).await?;
            let event = client.update(id, &draft).await?;
            println!("Updated event #{} '{}'", event.id, event.title);
        }
        EventCommand::Delete { id } => {
            client.delete(id).await?;
            println!("Deleted event #{}", id);
        }
        EventCommand::Rate { id, value, comment } => {
            let rating = client.rate(id, &RatingDraft { value, comment }).await?;
            println!("Rated event #{} with {} stars", id, rating.value);
        }
    }
    Ok(())
}

async fn workshops(gallery: &Gallery, command: WorkshopCommand) -> Result<()> {
    let client = gallery.workshops();
    match command {
        WorkshopCommand::List => {
            let viewer = gallery.resolve_viewer().await?;
            let cards: Vec<WorkshopCard> = client
                .list()
                .await?
                .into_iter()
                .map(|workshop| WorkshopCard::new(workshop, &viewer))
                .collect();
            println!("{}", views::render_workshops(&cards));
            print_toolbar(&viewer, Collection::Workshops);
        }
        WorkshopCommand::Create(fields) => {
            let draft = workshop_draft(WorkshopDraft::default(), fields).await?;
            let workshop = client.create(&draft).await?;
            println!("Created workshop #{} '{}'", workshop.id, workshop.title);
        }
        WorkshopCommand::Update { id, fields } => {
            let current = client.get(id).await?;
            let draft = workshop_draft(WorkshopDraft::from_workshop(&current), fields).await?;
            let workshop = client.update(id, &draft).await?;
            println!("Updated workshop #{} '{}'", workshop.id, workshop.title);
        }
        WorkshopCommand::Delete { id } => {
            client.delete(id).await?;
            println!("Deleted workshop #{}", id);
        }
        WorkshopCommand::Summary { id } => {
            let workshop = client.get(id).await?;
            println!("{}", gallery.ai().workshop_summary(&workshop).await?);
        }
    }
    Ok(())
}

async fn artworks(gallery: &Gallery, command: ArtworkCommand) -> Result<()> {
    let client = gallery.artworks();
    match command {
        ArtworkCommand::List => {
            let viewer = gallery.resolve_viewer().await?;
            let cards: Vec<ArtworkCard> = client
                .list()
                .await?
                .into_iter()
                .map(|artwork| ArtworkCard::new(artwork, &viewer))
                .collect();
            println!("{}", views::render_artworks(&cards));
            print_toolbar(&viewer, Collection::Artworks);
        }
        ArtworkCommand::Create(fields) => {
            let draft = artwork_draft(ArtworkDraft::default(), fields).await?;
            let artwork = client.create(&draft).await?;
            println!("Created artwork #{} '{}'", artwork.id, artwork.title);
        }
        ArtworkCommand::Update { id, fields } => {
            let current = client.get(id).await?;
            let draft = artwork_draft(ArtworkDraft::from_artwork(&current), fields).await?;
            let artwork = client.update(id, &draft).await?;
            println!("Updated artwork #{} '{}'", artwork.id, artwork.title);
        }
        ArtworkCommand::Delete { id } => {
            client.delete(id).await?;
            println!("Deleted artwork #{}", id);
        }
        ArtworkCommand::Analyze { id } => {
            let palette = client.analyze_colors(id).await?;
            println!("{}", palette.join(" "));
        }
        ArtworkCommand::Describe { title, keywords } => {
            println!("{}", gallery.ai().generate_description(&title, &keywords).await?);
        }
    }
    Ok(())
}

async fn reservations(gallery: &Gallery, command: ReservationCommand) -> Result<()> {
    let client = gallery.reservations();
    match command {
        ReservationCommand::List => {
            let viewer = gallery.resolve_viewer().await?;
            let rows: Vec<ReservationRow> = client
                .list()
                .await?
                .into_iter()
                .map(|reservation| ReservationRow::new(reservation, &viewer))
                .collect();
            println!("{}", views::render_reservations(&rows));
        }
        ReservationCommand::Status { id, status } => {
            let reservation = client.set_status(id, status).await?;
            println!("Reservation #{} is now {}", reservation.id, reservation.status);
        }
        ReservationCommand::Delete { id } => {
            client.delete(id).await?;
            println!("Deleted reservation #{}", id);
        }
    }
    Ok(())
}

async fn comments(gallery: &Gallery, command: CommentCommand) -> Result<()> {
    let client = gallery.comments();
    match command {
        CommentCommand::List { artwork } => {
            let viewer = gallery.resolve_viewer().await?;
            match artwork {
                Some(artwork_id) => {
                    let comments = client.list_for_artwork(artwork_id).await?;
                    let thread = CommentThread::new(artwork_id, comments, &viewer);
                    println!("{}", views::render_comments(&thread));
                }
                None => {
                    let comments = client.list().await?;
                    let mut ids: Vec<Id> = comments.iter().map(|c| c.artwork.id()).collect();
                    ids.sort_unstable();
                    ids.dedup();
                    for artwork_id in ids {
                        let thread = CommentThread::new(artwork_id, comments.clone(), &viewer);
                        let title = thread
                            .comments
                            .first()
                            .and_then(|view| view.comment.artwork.title().map(str::to_string))
                            .unwrap_or_else(|| format!("artwork #{}", artwork_id));
                        println!("{}", title);
                        println!("{}", views::render_comments(&thread));
                    }
                }
            }
        }
        CommentCommand::Post { artwork, content } => {
            let comment = client.create(&CommentDraft::new(artwork, &content)).await?;
            println!("Posted comment #{} ({})", comment.id, comment.moderation_status);
        }
        CommentCommand::Edit { id, content } => {
            let comment = client.update(id, &content).await?;
            println!("Edited comment #{} ({})", comment.id, comment.moderation_status);
        }
        CommentCommand::Delete { id } => {
            client.delete(id).await?;
            println!("Deleted comment #{}", id);
        }
        CommentCommand::Moderate { id, status, reason } => {
            let comment = client
                .update_moderation(id, status, reason.as_deref())
                .await?;
            println!("Comment #{} is {}", comment.id, comment.moderation_status);
        }
    }
    Ok(())
}
