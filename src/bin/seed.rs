use std::sync::Arc;

use clap::Parser;
use fake::{
    faker::{address::en::CityName, company::en::CompanyName, name::en::{FirstName, LastName}},
    Fake,
};
use sqlx::sqlite::SqlitePoolOptions;
use turfbook::{
    auth::AuthService,
    domain::{
        BookingStatus, NewAccount, NewBooking, NewTurf, PaymentMethod, PaymentStatus, Profile, Role,
    },
    repository::{
        BookingRepository, ProfileRepository, SqliteBookingRepository, SqliteProfileRepository,
        SqliteTurfRepository, TurfRepository,
    },
};

const SPORTS: &[&str] = &["Football", "Cricket", "Badminton", "Tennis", "Basketball"];
const AMENITIES: &[&str] = &["Floodlights", "Parking", "Changing Room", "Drinking Water", "Cafeteria", "First Aid"];

#[derive(Parser, Debug)]
#[command(about = "Fill a Turfbook database with demo accounts, turfs and bookings")]
struct Args {
    #[arg(long, env = "DATABASE_URL", default_value = "sqlite://turfbook.db?mode=rwc")]
    database_url: String,

    /// Number of turfs to create for the demo owner
    #[arg(long, default_value_t = 6)]
    turfs: usize,
}

async fn account(
    repo: &dyn ProfileRepository,
    email: &str,
    password: &str,
    role: Role,
) -> anyhow::Result<Profile> {
    let profile = repo
        .create_account(NewAccount {
            email: email.to_string(),
            password_hash: AuthService::hash_password(password).await?,
            first_name: FirstName().fake(),
            last_name: LastName().fake(),
            phone: Some(format!("+91{}", (7_000_000_000u64..9_999_999_999u64).fake::<u64>())),
            role,
        })
        .await?;

    println!("  ✅ {} {} ({} / {})", role, profile.full_name(), email, password);
    Ok(profile)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    println!("🌱 Starting database seeding...");

    let db_pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect(&args.database_url)
        .await?;

    println!("📋 Running migrations...");
    sqlx::migrate!("./migrations")
        .run(&db_pool)
        .await?;

    let profile_repo: Arc<dyn ProfileRepository> = Arc::new(SqliteProfileRepository::new(db_pool.clone()));
    let turf_repo = SqliteTurfRepository::new(db_pool.clone());
    let booking_repo = SqliteBookingRepository::new(db_pool.clone());

    println!("👥 Creating accounts...");
    account(profile_repo.as_ref(), "admin@turfbook.local", "Admin1234", Role::Admin).await?;
    let owner = account(profile_repo.as_ref(), "owner@turfbook.local", "Owner1234", Role::TurfOwner).await?;
    let customer = account(profile_repo.as_ref(), "player@turfbook.local", "Player1234", Role::Customer).await?;

    println!("🏟️  Creating {} turfs...", args.turfs);
    let mut turfs = Vec::with_capacity(args.turfs);
    for i in 0..args.turfs {
        let sport = SPORTS[i % SPORTS.len()];
        let company: String = CompanyName().fake();
        let hourly = (800..2500).fake::<u32>() as f64;
        let amenities = AMENITIES
            .iter()
            .skip(i % 3)
            .take((2..5).fake::<usize>())
            .map(|a| a.to_string())
            .collect();

        let turf = turf_repo
            .create(NewTurf {
                owner_id: owner.id,
                name: format!("{} {} Arena", company, sport),
                location: CityName().fake(),
                sport: sport.to_string(),
                description: Some(format!("{}-a-side {} turf", (5..12).fake::<u8>(), sport.to_lowercase())),
                image: None,
                price: hourly,
                price_per_hour: hourly,
                capacity: (10..30).fake::<i64>(),
                amenities,
                rating: (35..50).fake::<u8>() as f64 / 10.0,
            })
            .await?;
        turfs.push(turf);
    }
    println!("  ✅ Created {} turfs", turfs.len());

    println!("📅 Creating bookings...");
    let today = chrono::Utc::now().date_naive();
    let mut created = 0;
    for (i, turf) in turfs.iter().enumerate().take(3) {
        let method = [PaymentMethod::Card, PaymentMethod::Upi, PaymentMethod::Venue][i % 3];
        let (status, payment_status): (BookingStatus, PaymentStatus) = method.initial_state();
        let start = chrono::NaiveTime::from_hms_opt(17 + i as u32, 0, 0)
            .ok_or_else(|| anyhow::anyhow!("invalid seed slot"))?;

        let booking = booking_repo
            .create_if_available(NewBooking {
                user_id: customer.id,
                turf_id: turf.id,
                booking_date: today + chrono::Duration::days(2 + i as i64),
                start_time: start,
                end_time: start + chrono::Duration::hours(1),
                total_price: turf.price_per_hour,
                status,
                payment_status,
                payment_method: method,
            })
            .await?;

        if booking.is_some() {
            created += 1;
        }
    }
    println!("  ✅ Created {} bookings", created);

    println!("🎉 Seeding complete!");
    Ok(())
}
