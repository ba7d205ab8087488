//! Command-line control for the campus assistant.
//!
//! Manages the course timetable and settings in the shared database and runs
//! one-shot lookups (routes, news, contests) without starting the daemon.

use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use dotenvy::dotenv;
use std::sync::Arc;

use campus::core::Config;
use campus::database::Database;
use campus::features::location::{IpGeolocationProvider, LocationResolver, UnavailableSensor};
use campus::features::navigation::{estimate_route, CampusMap};
use campus::features::news::NewsScraper;
use campus::features::{get_app_version, get_features};

const WEEKDAYS: [&str; 7] = ["周一", "周二", "周三", "周四", "周五", "周六", "周日"];

/// Campus assistant control tool.
#[derive(Parser)]
#[command(name = "campusctl", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Add a weekly course
    AddCourse {
        name: String,
        teacher: String,
        location: String,
        /// Start time, HH:MM
        time: String,
        /// Day of week, 1 = Monday ... 7 = Sunday
        day: i64,
    },

    /// List courses, optionally for one day
    Courses { day: Option<i64> },

    /// Delete all courses with this name
    DeleteCourse { name: String },

    /// Estimate a walking route to a campus location
    Route {
        destination: String,
        /// Start latitude (defaults to the campus centre)
        #[arg(requires = "lon", allow_negative_numbers = true)]
        lat: Option<f64>,
        /// Start longitude
        #[arg(allow_negative_numbers = true)]
        lon: Option<f64>,
    },

    /// Resolve the current location and print diagnostics
    Location,

    /// Latest campus news
    News {
        /// Only show titles containing this keyword
        #[arg(short, long)]
        keyword: Option<String>,
    },

    /// Academic affairs notices
    Notices,

    /// Competition listings
    Contests,

    /// Save a setting
    Set { key: String, value: String },

    /// Read a setting
    Get { key: String },

    /// Show feature versions
    Features,
}

fn weekday_name(day: i64) -> &'static str {
    usize::try_from(day - 1)
        .ok()
        .and_then(|i| WEEKDAYS.get(i).copied())
        .unwrap_or("未知")
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    let cli = Cli::parse();
    let config = Config::from_env()?;

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&config.log_level))
        .init();

    match cli.command {
        Command::AddCourse {
            name,
            teacher,
            location,
            time,
            day,
        } => {
            chrono::NaiveTime::parse_from_str(&time, "%H:%M")
                .map_err(|_| anyhow!("时间格式应为 HH:MM: {time}"))?;
            if !(1..=7).contains(&day) {
                return Err(anyhow!("星期应为 1-7: {day}"));
            }
            let db = Database::new(&config.database_path).await?;
            db.add_course(&name, Some(&teacher), Some(&location), &time, day)
                .await?;
            println!("已添加课程: {name} ({} {time}, {location})", weekday_name(day));
        }

        Command::Courses { day } => {
            let db = Database::new(&config.database_path).await?;
            let courses = match day {
                Some(day) => db.get_courses_by_day(day).await?,
                None => db.get_all_courses().await?,
            };
            if courses.is_empty() {
                println!("暂无课程");
            }
            for course in courses {
                println!(
                    "{} {}  {}  {}  {}",
                    weekday_name(course.day_of_week),
                    course.time_slot,
                    course.course_name,
                    course.teacher.as_deref().unwrap_or("-"),
                    course.location.as_deref().unwrap_or("-")
                );
            }
        }

        Command::DeleteCourse { name } => {
            let db = Database::new(&config.database_path).await?;
            match db.delete_course(&name).await? {
                0 => println!("未找到课程: {name}"),
                n => println!("已删除 {n} 条课程: {name}"),
            }
        }

        Command::Route {
            destination,
            lat,
            lon,
        } => {
            let resolver = LocationResolver::new(Arc::new(UnavailableSensor));
            if let (Some(lat), Some(lon)) = (lat, lon) {
                resolver.set_manual_location(lat, lon, "命令行指定");
            }
            let current = resolver.get_current_location();
            let map = CampusMap::load_or_default(config.campus_locations_path.as_deref());

            println!("当前位置: {}", current.status_label());
            match estimate_route(&current, &destination, &map) {
                Ok(route) => println!("{route}"),
                Err(e) => println!("{e}"),
            }
        }

        Command::Location => {
            let provider =
                IpGeolocationProvider::new(config.geoip_url.clone(), config.geoip_timeout())?;
            let resolver = Arc::new(
                LocationResolver::new(Arc::new(UnavailableSensor)).with_fallback(Arc::new(provider)),
            );
            if let Some(task) = resolver.start() {
                task.await?;
            }
            for line in resolver.get_current_location().diagnostics() {
                println!("{line}");
            }
        }

        Command::News { keyword } => {
            let scraper =
                NewsScraper::new(&config.news_url, &config.notices_url, config.http_timeout())?;
            let news = match keyword {
                Some(keyword) => scraper.search_news(&keyword).await,
                None => scraper.get_latest_news().await,
            };
            if news.is_empty() {
                println!("没有匹配的新闻");
            }
            for (i, item) in news.iter().take(10).enumerate() {
                println!("{}. {}", i + 1, item.title);
                println!("   日期: {} | 来源: {}", item.date, item.source);
            }
        }

        Command::Notices => {
            let scraper =
                NewsScraper::new(&config.news_url, &config.notices_url, config.http_timeout())?;
            for (i, notice) in scraper.get_important_notices().await.iter().take(10).enumerate() {
                let flag = if notice.important { "★" } else { " " };
                println!("{flag} {}. {}", i + 1, notice.title);
                println!("   日期: {}", notice.date);
            }
        }

        Command::Contests => {
            let db = Database::new(&config.database_path).await?;
            db.seed_default_contests().await?;
            let today = chrono::Local::now().date_naive();
            for contest in db.get_all_contests().await? {
                let remaining = match contest.days_until_deadline(today) {
                    Some(days) if days >= 0 => format!("剩余 {days} 天"),
                    Some(_) => "已截止".to_string(),
                    None => String::new(),
                };
                println!("{}  截止: {} {remaining}", contest.name, contest.deadline);
                println!("   {}  {}", contest.description, contest.url);
            }
        }

        Command::Set { key, value } => {
            let db = Database::new(&config.database_path).await?;
            db.save_setting(&key, &value).await?;
            println!("{key} = {value}");
        }

        Command::Get { key } => {
            let db = Database::new(&config.database_path).await?;
            match db.get_setting(&key).await? {
                Some(value) => println!("{key} = {value}"),
                None => println!("{key} 未设置"),
            }
        }

        Command::Features => {
            println!("Campus Assistant v{}", get_app_version());
            for feature in get_features() {
                let toggle = if feature.toggleable { "toggleable" } else { "" };
                println!(
                    "{:<16} {:<8} since {:<8} {toggle}",
                    feature.name, feature.version, feature.since
                );
            }
        }
    }

    Ok(())
}
