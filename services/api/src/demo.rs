use crate::infra::{parse_timestamp, seed_demo_questions};
use chrono::{DateTime, Utc};
use clap::Args;
use polls::error::AppError;
use polls::polls::{
    AdminQuery, FixedClock, InMemoryPollRepository, PollService, VoteError,
};
use std::sync::Arc;

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Evaluate publication windows at this instant (RFC 3339). Defaults to now.
    #[arg(long, value_parser = parse_timestamp)]
    pub(crate) now: Option<DateTime<Utc>>,
    /// Print the admin changelist after the voting walkthrough.
    #[arg(long)]
    pub(crate) admin: bool,
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs { now, admin } = args;
    let now = now.unwrap_or_else(Utc::now);

    let repository = Arc::new(InMemoryPollRepository::new());
    let clock = Arc::new(FixedClock::new(now));
    let service = PollService::new(repository, clock);
    let seeded = seed_demo_questions(&service, now)?;

    println!("Polls demo at {}", now.to_rfc3339());
    println!("\nLatest questions");
    let listing = service.list_visible_questions()?;
    if listing.is_empty() {
        println!("  No polls are available.");
    }
    for summary in &listing {
        let marker = if summary.was_published_recently {
            " (new)"
        } else {
            ""
        };
        println!(
            "  - [{}] {}{} published {}",
            summary.id,
            summary.question_text,
            marker,
            summary.pub_date.format("%Y-%m-%d %H:%M")
        );
    }

    let Some(first) = listing.first() else {
        return Ok(());
    };
    let detail = service.question_detail(first.id)?;
    println!("\nVoting on \"{}\"", detail.question_text);
    for (position, choice) in detail.choices.iter().enumerate() {
        let ballots = detail.choices.len() - position;
        for _ in 0..ballots {
            match service.record_vote(detail.id, Some(choice.id)) {
                Ok(receipt) => println!(
                    "  + {} -> redirect {}",
                    choice.choice_text,
                    receipt.redirect.path()
                ),
                Err(err) => println!("  ! vote failed: {err}"),
            }
        }
    }

    match service.record_vote(detail.id, None) {
        Err(VoteError::InvalidSelection { .. }) => {
            println!("  ! empty ballot rejected: {}", polls::polls::NO_CHOICE_SELECTED)
        }
        Ok(_) => println!("  ! empty ballot was unexpectedly counted"),
        Err(err) => println!("  ! empty ballot failed: {err}"),
    }

    let results = service.question_results(detail.id)?;
    println!("\nResults ({} votes)", results.total_votes);
    for tally in &results.choices {
        println!("  - {}: {}", tally.choice_text, tally.votes);
    }

    if let Some(scheduled) = seeded.iter().find(|record| !record.question.is_published(now)) {
        match service.question_detail(scheduled.id()) {
            Err(err) => println!(
                "\nScheduled question {} is hidden until {} ({err})",
                scheduled.id(),
                scheduled.question.pub_date.format("%Y-%m-%d %H:%M")
            ),
            Ok(_) => println!("\nScheduled question {} is already visible", scheduled.id()),
        }
    }

    if admin {
        println!("\nAdmin changelist");
        for row in service.admin_questions(&AdminQuery::default())? {
            println!(
                "  - [{}] {} | {} | recent: {}",
                row.id,
                row.question_text,
                row.pub_date.format("%Y-%m-%d %H:%M"),
                row.was_published_recently
            );
        }
    }

    Ok(())
}
