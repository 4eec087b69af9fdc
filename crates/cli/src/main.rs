use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use data_loader::{DataSource, FileSource, InteractionMatrix, StudentId};
use engine::{EngineConfig, Outcome, RecommendationEngine, Recommendations};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::debug;

/// course-recs - Elective course recommendation engine
#[derive(Parser)]
#[command(name = "course-recs")]
#[command(about = "Elective course recommendations from grades and ratings", long_about = None)]
struct Cli {
    /// Directory holding students.dat, courses.dat and choices.dat
    #[arg(short, long, default_value = "data/courses")]
    data_dir: PathBuf,

    /// JSON file overriding engine settings
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Recommend courses and similar students for a student
    Recommend {
        /// Student ID to get recommendations for
        #[arg(long)]
        student_id: StudentId,

        /// Number of courses to return
        #[arg(long, default_value = "20")]
        courses: usize,

        /// Number of similar students to return
        #[arg(long, default_value = "20")]
        students: usize,

        /// Print the normalized chart payload as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show a student's profile and course history
    Student {
        /// Student ID to display
        #[arg(long)]
        student_id: StudentId,
    },

    /// Search for courses by name
    Search {
        /// Course name to search for (case-insensitive substring match)
        #[arg(long)]
        title: String,
    },

    /// List courses chosen by the same students as a course
    Similar {
        #[arg(long)]
        course_id: String,

        #[arg(long, default_value = "10")]
        limit: usize,
    },

    /// Run sequential requests for random students and report latency
    Benchmark {
        /// Number of requests to make
        #[arg(long, default_value = "100")]
        requests: usize,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;
    debug!(?config, "Reading course data from {}", cli.data_dir.display());
    let source = Arc::new(FileSource::new(cli.data_dir.clone()));

    match cli.command {
        Commands::Recommend {
            student_id,
            courses,
            students,
            json,
        } => handle_recommend(source, config, &student_id, courses, students, json)?,
        Commands::Student { student_id } => handle_student(&source, &config, &student_id)?,
        Commands::Search { title } => handle_search(&source, &title)?,
        Commands::Similar { course_id, limit } => {
            handle_similar(source, config, &course_id, limit)?
        }
        Commands::Benchmark { requests } => handle_benchmark(source, config, requests)?,
    }

    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<EngineConfig> {
    let Some(path) = path else {
        return Ok(EngineConfig::default());
    };
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("Invalid config {}", path.display()))
}

/// Handle the 'recommend' command
fn handle_recommend(
    source: Arc<FileSource>,
    config: EngineConfig,
    student_id: &str,
    top_courses: usize,
    top_students: usize,
    json: bool,
) -> Result<()> {
    let engine = RecommendationEngine::new(source, config);

    let start = Instant::now();
    let recommendations = engine.get_recommendations(student_id, top_courses, top_students)?;
    let elapsed = start.elapsed();

    if json {
        let payload = engine::chart_payload(&recommendations);
        println!("{}", serde_json::to_string_pretty(&payload)?);
        return Ok(());
    }

    match recommendations.outcome {
        Outcome::UnknownStudent => {
            return Err(anyhow!("Student {} not found", student_id));
        }
        Outcome::EmptyCatalog => {
            println!("{}", "The catalog has no courses".yellow());
            return Ok(());
        }
        Outcome::LegacyFallback => {
            println!("{}", "Answered by the latent factor fallback".yellow());
        }
        Outcome::Ranked { route, source } => {
            println!(
                "{} route {:?}, ranked by {}",
                "✓".green(),
                route,
                source.map_or("nothing".to_string(), |s| format!("{:?}", s))
            );
        }
    }

    print_recommendations(&recommendations);
    println!("\nComputed in {:?}", elapsed);
    Ok(())
}

/// Handle the 'student' command
fn handle_student(source: &FileSource, config: &EngineConfig, student_id: &str) -> Result<()> {
    let matrix = InteractionMatrix::load(source, &config.admin_id)
        .context("Failed to load course data")?;
    let idx = matrix
        .student_idx(student_id)
        .ok_or_else(|| anyhow!("Student {} not found", student_id))?;
    let student = matrix
        .student(idx)
        .ok_or_else(|| anyhow!("Student {} not found", student_id))?;

    println!("{}", format!("Student {}: {}", student.id, student.name).bold().blue());
    println!(
        "{}Major: {}",
        "• ".green(),
        student.major.as_deref().unwrap_or("(none)")
    );
    println!(
        "{}Cohort: {}",
        "• ".green(),
        student.cohort.map_or("(unknown)".to_string(), |c| c.to_string())
    );

    let mut history: Vec<_> = matrix
        .taken_courses(idx)
        .into_iter()
        .filter_map(|c| matrix.course(c).map(|course| (course, matrix.score(idx, c))))
        .collect();
    history.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

    let average = if history.is_empty() {
        0.0
    } else {
        history.iter().map(|(_, score)| score).sum::<f64>() / history.len() as f64
    };
    println!("{}Courses taken: {}", "• ".cyan(), history.len());
    println!("{}Average preference: {:.2}", "• ".cyan(), average);

    println!("Course history:");
    for (course, score) in history {
        println!(
            "  - {} {} [{}] preference {:.2}",
            course.id, course.name, course.classification, score
        );
    }
    Ok(())
}

/// Handle the 'search' command
fn handle_search(source: &FileSource, title: &str) -> Result<()> {
    let courses = source.list_courses().context("Failed to load courses")?;
    let needle = title.to_lowercase();

    // Exact matches first, then substring matches, each in catalog order
    let mut matches: Vec<_> = courses
        .iter()
        .filter_map(|course| {
            let name = course.name.to_lowercase();
            if name == needle {
                Some((0, course))
            } else if name.contains(&needle) {
                Some((1, course))
            } else {
                None
            }
        })
        .collect();
    matches.sort_by_key(|(rank, _)| *rank);

    println!("{}", format!("Search results for '{}':", title).bold().blue());
    if matches.is_empty() {
        println!("  no matching courses");
    }
    for (_, course) in matches.iter().take(20) {
        println!(
            "{}: {} [{}] {}",
            course.id,
            course.name,
            course.classification,
            course
                .owning_major
                .as_deref()
                .map_or("open to all".to_string(), |m| format!("owned by {}", m))
        );
    }
    Ok(())
}

/// Handle the 'similar' command
fn handle_similar(
    source: Arc<FileSource>,
    config: EngineConfig,
    course_id: &str,
    limit: usize,
) -> Result<()> {
    let courses = source.list_courses().context("Failed to load courses")?;
    let engine = RecommendationEngine::new(source, config);
    let similar = engine.similar_courses(course_id, limit)?;

    println!("{}", format!("Courses similar to {}:", course_id).bold().blue());
    for (rank, entry) in similar.iter().enumerate() {
        let name = courses
            .iter()
            .find(|c| c.id == entry.id)
            .map_or("", |c| c.name.as_str());
        println!(
            "{}. {} {} - similarity {:.3}",
            (rank + 1).to_string().green(),
            entry.id,
            name,
            entry.score
        );
    }
    Ok(())
}

/// Handle the 'benchmark' command
fn handle_benchmark(source: Arc<FileSource>, config: EngineConfig, requests: usize) -> Result<()> {
    if requests == 0 {
        return Err(anyhow!("--requests must be at least 1"));
    }

    let students: Vec<StudentId> = source
        .list_students()
        .context("Failed to load students")?
        .into_iter()
        .map(|s| s.id)
        .filter(|id| *id != config.admin_id)
        .collect();
    if students.is_empty() {
        return Err(anyhow!("No students to benchmark with"));
    }

    let engine = RecommendationEngine::new(source, config);

    // One engine, one request at a time: the similarity caches are not shared
    let mut timings: Vec<Duration> = Vec::with_capacity(requests);
    let mut failures = 0usize;
    for _ in 0..requests {
        let student = &students[rand::random::<u32>() as usize % students.len()];
        let start = Instant::now();
        if engine.get_recommendations(student, 20, 20).is_err() {
            failures += 1;
        }
        timings.push(start.elapsed());
    }

    let total_time: Duration = timings.iter().sum();
    let avg_latency = total_time / timings.len() as u32;
    timings.sort();
    let percentile = |p: f64| timings[((timings.len() as f64 * p) as usize).min(timings.len() - 1)];
    let throughput = requests as f64 / total_time.as_secs_f64().max(f64::EPSILON);

    println!("{}", "Benchmark results:".bold().blue());
    println!("Requests: {} ({} failed)", requests, failures);
    println!("Total time: {:?}", total_time);
    println!("Average latency: {:?}", avg_latency);
    println!("P50 latency: {:?}", percentile(0.50));
    println!("P95 latency: {:?}", percentile(0.95));
    println!("P99 latency: {:?}", percentile(0.99));
    println!("Throughput: {:.2} requests/second", throughput);

    Ok(())
}

/// Print ranked courses and similar students
fn print_recommendations(recommendations: &Recommendations) {
    println!("{}", "Course Recommendations:".bold().blue());
    if recommendations.courses.is_empty() {
        println!("  no eligible courses left");
    }
    for (rank, entry) in recommendations.courses.iter().enumerate() {
        let name = recommendations
            .course_names
            .get(&entry.id)
            .map_or("", String::as_str);
        println!(
            "{}. {} {} - Score: {:.2}",
            (rank + 1).to_string().green(),
            entry.id,
            name,
            entry.score
        );
    }

    println!("{}", "Similar Students:".bold().blue());
    if recommendations.students.is_empty() {
        println!("  no similar students");
    }
    for (rank, entry) in recommendations.students.iter().enumerate() {
        let name = recommendations
            .student_names
            .get(&entry.id)
            .map_or("", String::as_str);
        println!(
            "{}. {} {} - Similarity: {:.3}",
            (rank + 1).to_string().cyan(),
            entry.id,
            name,
            entry.score
        );
    }
}
