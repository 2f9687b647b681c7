//! Loads a handful of movies into Postgres and prints a development session
//! token signed with `auth.jwt_secret`.
//!
//! Usage: `APP__STORAGE__BACKEND=postgres APP__DATABASE__URL=... cargo run -p seed`

use anyhow::Context;
use auth_adapters::JwtIssuer;
use configs::Settings;
use domains::validation::current_year;
use domains::{AuthUser, Movie, MovieRepository, NewMovie};
use secrecy::ExposeSecret;
use storage_adapters::postgres::{connect, migrate};
use storage_adapters::PgMovieRepository;
use tracing::info;

const SEED_USER: &str = "user_seed";

fn catalog() -> Vec<NewMovie> {
    let movie = |title: &str, director: &str, year: i32, genre: &str, runtime: i32, description: &str| NewMovie {
        title: title.into(),
        director: director.into(),
        release_year: Some(year),
        genre: genre.into(),
        description: Some(description.into()),
        runtime: Some(runtime),
    };
    vec![
        movie("The Worst Person in the World", "Joachim Trier", 2021, "Drama", 128, "Four years in the life of Julie."),
        movie("Trollhunter", "André Øvredal", 2010, "Fantasy", 103, "Students follow a man who hunts trolls."),
        movie("Elling", "Petter Næss", 2001, "Comedy", 89, "Two men try life outside the institution."),
        movie("Cold Prey", "Roar Uthaug", 2006, "Horror", 97, "Snowboarders seek shelter in a deserted hotel."),
        movie("Kon-Tiki", "Joachim Rønning", 2012, "Adventure", 118, "Crossing the Pacific on a balsa raft."),
        movie("Ådalen 31", "Bo Widerberg", 1969, "Drama", 114, "A strike in a Swedish sawmill town."),
    ]
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_env_filter("info").init();

    let settings = Settings::load().context("loading configuration")?;
    let url = settings
        .database
        .url
        .as_ref()
        .context("set database.url (APP__DATABASE__URL) to seed")?;

    let pool = connect(url.expose_secret(), settings.database.max_connections)
        .await
        .context("connecting to postgres")?;
    migrate(&pool).await.context("running migrations")?;
    let repo = PgMovieRepository::new(pool);

    let owner = AuthUser::from_profile(SEED_USER, Some("Seed"), Some("Curator"), None);
    if repo.count().await? > 0 {
        info!("movies table is not empty, skipping inserts");
    } else {
        let year = current_year();
        for input in catalog() {
            let input = input.validate(year)?;
            let movie = repo.insert(Movie::create(input, &owner)).await?;
            info!(id = %movie.id, title = %movie.title, "seeded");
        }
    }

    if let Some(secret) = &settings.auth.jwt_secret {
        let issuer = JwtIssuer::hs256(secret.expose_secret().as_bytes(), settings.auth.issuer.as_deref());
        let token = issuer.issue(
            SEED_USER,
            Some("Seed"),
            Some("Curator"),
            None,
            chrono::Duration::days(30),
        )?;
        println!("dev token for {SEED_USER} (30 days):\n{token}");
    }

    Ok(())
}
