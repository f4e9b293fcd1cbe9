use std::path::PathBuf;

use clap::{Parser, Subcommand};
use coursemate::catalog;
use coursemate::config::Config;
use coursemate::error::{AppError, AppResult};
use coursemate::llm::{self, LlmError};
use coursemate::materials::{self, STUDY_GUIDE_FILE, week_dir_name};
use coursemate::model::entity::{
    Course, CourseCreate, Lesson, LessonCreate, UserEntity, UserEntityCreateUpdate, WeekVideo,
};
use coursemate::model::{
    CrudRepository, DatabaseError, DbConnection, ModelManager, PaginatableRepository,
};
use coursemate::transcript::{ParserOptions, TranscriptParser};
use coursemate::videos::{self, VideoError};
use coursemate::web::{AuthenticatedUser, UserRole};
use coursemate::{pdf, study_guide};

#[derive(Parser, Debug)]
#[command(about = "Maintenance tool for the CourseMate database and course materials", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Manage users
    User {
        #[command(subcommand)]
        action: UserCommands,
    },

    /// Manage courses
    Course {
        #[command(subcommand)]
        action: CourseCommands,
    },

    /// Manage lessons
    Lesson {
        #[command(subcommand)]
        action: LessonCommands,
    },

    /// Inspect the static course catalog
    Catalog {
        #[command(subcommand)]
        action: CatalogCommands,
    },

    /// Parse transcripts offline
    Transcript {
        #[command(subcommand)]
        action: TranscriptCommands,
    },

    /// Crawl course websites for lecture material
    Materials {
        #[command(subcommand)]
        action: MaterialsCommands,
    },

    /// Generate weekly study guides from downloaded material
    Guides {
        #[command(subcommand)]
        action: GuideCommands,
    },

    /// Find and store week videos
    Videos {
        #[command(subcommand)]
        action: VideoCommands,
    },
}

#[derive(Subcommand, Debug)]
pub enum UserCommands {
    Add {
        #[arg(long)]
        email: String,
        #[arg(long)]
        name: String,
        #[arg(long)]
        password: String,
        #[arg(long, default_value = "user")]
        role: String,
    },
    List {
        #[arg(long, default_value_t = 50)]
        limit: i64,
        #[arg(long, default_value_t = 0)]
        offset: i64,
    },
    /// Deletes the account and everything it owns
    Remove {
        #[arg(long)]
        email: String,
    },
    /// Sets a new password
    Passwd {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum CourseCommands {
    Add {
        #[arg(long)]
        code: String,
        #[arg(long)]
        name: String,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        instructor: Option<String>,
        #[arg(long)]
        semester: Option<String>,
        #[arg(long)]
        units: Option<i32>,
    },
}

#[derive(Subcommand, Debug)]
pub enum LessonCommands {
    Add {
        /// Code of the course to attach the lesson to
        #[arg(long)]
        course: String,
        #[arg(long)]
        title: String,
        /// Markdown file used as the lesson description
        #[arg(long)]
        file: Option<PathBuf>,
        #[arg(long)]
        week: Option<i32>,
        #[arg(long, default_value_t = 0)]
        order_index: i32,
    },
}

#[derive(Subcommand, Debug)]
pub enum CatalogCommands {
    List,
}

#[derive(Subcommand, Debug)]
pub enum TranscriptCommands {
    /// Parses a PDF or plain text transcript and prints the result as JSON
    Parse { file: PathBuf },
}

#[derive(Subcommand, Debug)]
pub enum MaterialsCommands {
    Download { course: String },
}

#[derive(Subcommand, Debug)]
pub enum GuideCommands {
    Generate { course: String },
}

#[derive(Subcommand, Debug)]
pub enum VideoCommands {
    Generate {
        course: String,
        /// Only this week; all weeks otherwise
        #[arg(long)]
        week: Option<u32>,
        #[arg(
            long,
            default_value_t = 3,
            value_parser = clap::value_parser!(u64).range(1..=videos::MAX_VIDEOS_LIMIT as u64)
        )]
        max_videos: u64,
    },
    Show { course: String },
}

fn connect(config: &Config) -> AppResult<ModelManager> {
    let db = DbConnection::connect(config.app().database_uri())?;
    Ok(ModelManager::new(db))
}

async fn find_user(mm: &ModelManager, email: &str) -> AppResult<UserEntity> {
    let user = UserEntity::find_by_email(mm, &email.trim().to_lowercase())
        .await?
        .ok_or(DatabaseError::SqlxError(sqlx::Error::RowNotFound))?;
    Ok(user)
}

async fn read_transcript(file: &PathBuf) -> AppResult<String> {
    if pdf::is_pdf_filename(&file.to_string_lossy()) {
        return Ok(pdf::extract_file_blocking(file).await?);
    }
    Ok(tokio::fs::read_to_string(file).await?)
}

#[tokio::main]
async fn main() -> AppResult<()> {
    coursemate::setup_trace();
    let args = Cli::parse();
    let config = Config::get_or_init(true).await;
    let actor = AuthenticatedUser::admin();

    match args.command {
        Commands::User { action } => match action {
            UserCommands::Add { email, name, password, role } => {
                let mm = connect(config)?;
                let mut user = UserEntity::create(
                    &mm,
                    &actor,
                    UserEntityCreateUpdate {
                        email: email.trim().to_lowercase(),
                        name,
                        image_url: None,
                        google_id: None,
                        password_hash: Some(coursemate::auth::hash_password(&password)?),
                    },
                )
                .await?;
                let role = UserRole::from(role.as_str());
                if role != user.role() {
                    user.set_role(&mm, role).await?;
                }
                println!("User created: {} ({})", user.email(), user.role());
            }
            UserCommands::List { limit, offset } => {
                let mm = connect(config)?;
                let page = UserEntity::page(&mm, &actor, limit, offset).await?;
                for user in &page.items {
                    println!("{}\t{}\t{}\t{}", user.id(), user.email(), user.name(), user.role());
                }
                println!("{} of {} users", page.items.len(), page.total);
            }
            UserCommands::Remove { email } => {
                let mm = connect(config)?;
                let user = find_user(&mm, &email).await?;
                let email = user.email().to_string();
                user.delete(&mm, &actor).await?;
                println!("User removed: {email}");
            }
            UserCommands::Passwd { email, password } => {
                let mm = connect(config)?;
                let user = find_user(&mm, &email).await?;
                let data = UserEntityCreateUpdate {
                    email: user.email().to_string(),
                    name: user.name().to_string(),
                    image_url: user.image_url().map(str::to_string),
                    google_id: None,
                    password_hash: Some(coursemate::auth::hash_password(&password)?),
                };
                let user = user.update(&mm, &actor, data).await?;
                println!("Password updated: {}", user.email());
            }
        },

        Commands::Course { action } => match action {
            CourseCommands::Add { code, name, description, instructor, semester, units } => {
                let mm = connect(config)?;
                let course = Course::create(
                    &mm,
                    &actor,
                    CourseCreate {
                        code: code.to_uppercase(),
                        name,
                        description,
                        instructor,
                        semester,
                        units,
                        is_active: Some(true),
                    },
                )
                .await?;
                println!("Course created: {} {}", course.code(), course.id());
            }
        },

        Commands::Lesson { action } => match action {
            LessonCommands::Add { course, title, file, week, order_index } => {
                let mm = connect(config)?;
                let course = Course::find_by_code(&mm, &course.to_uppercase())
                    .await?
                    .ok_or(DatabaseError::SqlxError(sqlx::Error::RowNotFound))?;
                let description = match file {
                    Some(file) => Some(tokio::fs::read_to_string(file).await?),
                    None => None,
                };

                let lesson = Lesson::create(
                    &mm,
                    LessonCreate {
                        course_id: course.id(),
                        title,
                        description,
                        week,
                        order_index: Some(order_index),
                        duration: None,
                        difficulty: None,
                        is_active: Some(true),
                    },
                )
                .await?;
                println!("Lesson created: {} {}", lesson.title(), lesson.id());
            }
        },

        Commands::Catalog { action } => match action {
            CatalogCommands::List => {
                for code in catalog::all_courses() {
                    let info = catalog::info(code);
                    let prereqs = if info.prerequisites.is_empty() {
                        String::from("-")
                    } else {
                        info.prerequisites.join(", ")
                    };
                    println!("{:<10} {:<14} {prereqs}", info.code, info.category);
                }
            }
        },

        Commands::Transcript { action } => match action {
            TranscriptCommands::Parse { file } => {
                let raw = read_transcript(&file).await?;
                let parsed = TranscriptParser::new(ParserOptions::from(config.transcript())).parse(&raw);
                let json = serde_json::to_string_pretty(&parsed).map_err(std::io::Error::other)?;
                println!("{json}");
            }
        },

        Commands::Materials { action } => match action {
            MaterialsCommands::Download { course } => {
                let code = course.to_uppercase();
                let report = materials::download_course_materials(
                    &code,
                    config.app().data_dir(),
                    config.crawler(),
                )
                .await?;
                println!(
                    "{code}: {} weeks, {} files downloaded, {} placeholders written",
                    report.weeks_found, report.files_downloaded, report.placeholders_written
                );
            }
        },

        Commands::Guides { action } => match action {
            GuideCommands::Generate { course } => {
                let code = course.to_uppercase();
                let llm = llm::from_config(config.llm())?.ok_or(LlmError::MissingApiKey)?;
                let report =
                    study_guide::generate_course_guides(llm.as_ref(), config.app().data_dir(), &code)
                        .await?;
                println!(
                    "{code}: generated {:?}, skipped {:?} of {} weeks",
                    report.generated, report.skipped, report.total_weeks
                );
                if report.quota_exceeded {
                    println!("stopped early: language model quota exceeded");
                }
            }
        },

        Commands::Videos { action } => match action {
            VideoCommands::Generate { course, week, max_videos } => {
                let max_videos = max_videos as usize;
                let code = course.to_uppercase();
                let mm = connect(config)?;
                let api = videos::from_config(config.youtube())?.ok_or(VideoError::MissingApiKey)?;
                let guides = materials::generated_dir(config.app().data_dir(), &code);

                match week {
                    Some(week) => {
                        let path = guides.join(week_dir_name(week)).join(STUDY_GUIDE_FILE);
                        let guide = tokio::fs::read_to_string(&path).await?;
                        let found =
                            videos::find_videos_for_week(api.as_ref(), &code, &guide, max_videos)
                                .await?;
                        let saved = WeekVideo::replace_week(&mm, &code, week as i32, &found).await?;
                        println!("{code} week {week}: {saved} of {} videos stored", found.len());
                    }
                    None => {
                        let report =
                            videos::process_course_weeks(api.as_ref(), &mm, &code, &guides, max_videos)
                                .await;
                        println!(
                            "{code}: {} videos for {} of {} weeks",
                            report.total_videos, report.processed_weeks, report.total_weeks
                        );
                        for error in &report.errors {
                            println!("  {error}");
                        }
                        if report.quota_exceeded {
                            return Err(AppError::VideoError(VideoError::QuotaExceeded(
                                String::from("stopped early"),
                            )));
                        }
                    }
                }
            }
            VideoCommands::Show { course } => {
                let code = course.to_uppercase();
                let mm = connect(config)?;
                let stored = WeekVideo::by_course(&mm, &code).await?;
                if stored.is_empty() {
                    println!("No videos stored for {code}");
                }
                for video in stored {
                    println!(
                        "W{:<3} {:>5.1}  {}  {}",
                        video.week_number(),
                        video.relevance_score(),
                        video.video_id(),
                        video.title()
                    );
                }
            }
        },
    }

    Ok(())
}
