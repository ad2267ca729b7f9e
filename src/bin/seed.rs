use std::str::FromStr;

use chrono::{Duration, Utc};
use clap::Parser;
use fake::{
    faker::lorem::en::{Paragraph, Sentence},
    Fake,
};
use noticeboard::domain::{fold_for_search, Category, Role};
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    Sqlite, Transaction,
};

#[derive(Parser, Debug)]
#[command(name = "seed", about = "Populate the notice board database with demo data")]
struct Args {
    #[arg(long, env = "DATABASE_URL", default_value = "sqlite://noticeboard.db")]
    database_url: String,

    /// Extra lorem-ipsum notices to generate on top of the fixed demo set.
    #[arg(long, default_value_t = 0)]
    random_notices: usize,
}

struct SeedUser {
    uid: &'static str,
    email: &'static str,
    name: &'static str,
    role: Role,
    department: &'static str,
}

struct SeedNotice {
    title: String,
    content: String,
    category: Category,
    subcategory: String,
    author_uid: &'static str,
    author_name: &'static str,
    priority: i32,
    age: Duration,
    lifetime: Duration,
}

const USERS: &[SeedUser] = &[
    SeedUser {
        uid: "demo_admin",
        email: "demo.admin@example.com",
        name: "Demo Admin",
        role: Role::Admin,
        department: "Administration",
    },
    SeedUser {
        uid: "test_admin_1",
        email: "admin@test.com",
        name: "Admin User",
        role: Role::Admin,
        department: "Administration",
    },
    SeedUser {
        uid: "test_faculty_1",
        email: "faculty@test.com",
        name: "Faculty Member",
        role: Role::Faculty,
        department: "Computer Science",
    },
    SeedUser {
        uid: "test_student_1",
        email: "student@test.com",
        name: "Test Student",
        role: Role::Student,
        department: "Computer Science",
    },
];

fn demo_notices() -> Vec<SeedNotice> {
    vec![
        SeedNotice {
            title: "Welcome to Virtual Notice Board".to_string(),
            content: "This is a test notice to demonstrate the Virtual Notice Board system. \
                      Please feel free to explore the features."
                .to_string(),
            category: Category::Main,
            subcategory: "announcement".to_string(),
            author_uid: "test_admin_1",
            author_name: "Admin User",
            priority: 1,
            age: Duration::days(2),
            lifetime: Duration::days(30),
        },
        SeedNotice {
            title: "Coding Competition 2023".to_string(),
            content: "Annual coding competition is scheduled for next month. Register now to participate!"
                .to_string(),
            category: Category::Department,
            subcategory: "Computer Science".to_string(),
            author_uid: "test_faculty_1",
            author_name: "Faculty Member",
            priority: 2,
            age: Duration::days(1),
            lifetime: Duration::days(14),
        },
        SeedNotice {
            title: "Sports Week Announcement".to_string(),
            content: "Sports week will be held from next Monday. All students are encouraged to participate."
                .to_string(),
            category: Category::Club,
            subcategory: "Sports Club".to_string(),
            author_uid: "test_faculty_1",
            author_name: "Faculty Member",
            priority: 1,
            age: Duration::hours(6),
            lifetime: Duration::days(7),
        },
        SeedNotice {
            title: "Library Maintenance".to_string(),
            content: "The central library will be closed for maintenance this weekend. \
                      Plan your studies accordingly."
                .to_string(),
            category: Category::Main,
            subcategory: "announcement".to_string(),
            author_uid: "test_admin_1",
            author_name: "Admin User",
            priority: 1,
            age: Duration::hours(2),
            lifetime: Duration::days(2),
        },
    ]
}

fn random_notice(index: usize) -> SeedNotice {
    let (category, subcategory) = match index % 3 {
        0 => (Category::Main, "announcement"),
        1 => (Category::Club, "Sports Club"),
        _ => (Category::Department, "Computer Science"),
    };

    SeedNotice {
        title: Sentence(3..7).fake(),
        content: Paragraph(2..5).fake(),
        category,
        subcategory: subcategory.to_string(),
        author_uid: "test_faculty_1",
        author_name: "Faculty Member",
        priority: (0..10).fake(),
        age: Duration::hours((1..72).fake()),
        lifetime: Duration::days((1..30).fake()),
    }
}

async fn seed_users(tx: &mut Transaction<'_, Sqlite>) -> anyhow::Result<usize> {
    let now = Utc::now().naive_utc();
    let mut created = 0;

    for user in USERS {
        let exists: Option<String> = sqlx::query_scalar("SELECT uid FROM users WHERE uid = ?")
            .bind(user.uid)
            .fetch_optional(&mut **tx)
            .await?;
        if exists.is_some() {
            println!("  ⏭️  User {} already exists", user.uid);
            continue;
        }

        sqlx::query(
            r#"
            INSERT INTO users (uid, email, name, role, department, is_active, created_at)
            VALUES (?, ?, ?, ?, ?, 1, ?)
            "#
        )
        .bind(user.uid)
        .bind(user.email)
        .bind(user.name)
        .bind(user.role.as_str())
        .bind(user.department)
        .bind(now)
        .execute(&mut **tx)
        .await?;

        created += 1;
    }

    Ok(created)
}

async fn seed_notices(tx: &mut Transaction<'_, Sqlite>, notices: Vec<SeedNotice>) -> anyhow::Result<usize> {
    let now = Utc::now();
    let mut created = 0;

    for notice in notices {
        let exists: Option<i64> = sqlx::query_scalar("SELECT id FROM notices WHERE title = ?")
            .bind(&notice.title)
            .fetch_optional(&mut **tx)
            .await?;
        if exists.is_some() {
            println!("  ⏭️  Notice \"{}\" already exists", notice.title);
            continue;
        }

        let created_at = (now - notice.age).naive_utc();
        let expires_at = (now + notice.lifetime).naive_utc();

        sqlx::query(
            r#"
            INSERT INTO notices (
                title, content, category, subcategory, author_uid, author_name,
                is_active, priority, created_at, updated_at, expires_at,
                search_title, search_content
            ) VALUES (?, ?, ?, ?, ?, ?, 1, ?, ?, ?, ?, ?, ?)
            "#
        )
        .bind(&notice.title)
        .bind(&notice.content)
        .bind(notice.category.as_str())
        .bind(&notice.subcategory)
        .bind(notice.author_uid)
        .bind(notice.author_name)
        .bind(notice.priority)
        .bind(created_at)
        .bind(created_at)
        .bind(expires_at)
        .bind(fold_for_search(&notice.title))
        .bind(fold_for_search(&notice.content))
        .execute(&mut **tx)
        .await?;

        created += 1;
    }

    Ok(created)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    println!("🌱 Starting database seeding...");

    let connect_options = SqliteConnectOptions::from_str(&args.database_url)?
        .create_if_missing(true);
    let db_pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(connect_options)
        .await?;

    println!("📋 Running migrations...");
    sqlx::migrate!("./migrations")
        .run(&db_pool)
        .await?;

    let mut notices = demo_notices();
    notices.extend((0..args.random_notices).map(random_notice));

    let mut tx = db_pool.begin().await?;

    let outcome = async {
        println!("👥 Creating users...");
        let users = seed_users(&mut tx).await?;
        println!("  ✅ Created {} users", users);

        println!("📌 Creating notices...");
        let notices = seed_notices(&mut tx, notices).await?;
        println!("  ✅ Created {} notices", notices);

        anyhow::Ok(())
    }
    .await;

    match outcome {
        Ok(()) => {
            tx.commit().await?;
            println!("✨ Database seeding completed successfully!");
            Ok(())
        }
        Err(e) => {
            eprintln!("❌ Error seeding database: {}", e);
            tx.rollback().await?;
            Err(e)
        }
    }
}
