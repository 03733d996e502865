//! Run orchestration: load → parse → enrich → export.
//!
//! For every race, in roster order, the participants are split by sex and
//! each half is enriched and exported as one batch. Once every race is
//! done, the enriched participants of each sex are exported again as one
//! cross-race file.

use chrono::{DateTime, Utc};
use indicatif::{ProgressBar, ProgressStyle};

use crate::config::Config;
use crate::enrichment::{EnrichmentService, RunnerSearchApi, UtmbClient};
use crate::error::{Result, ResultExt};
use crate::export::{Column, Exporter, aggregate_file_stem, race_file_stem};
use crate::model::{Participant, Sex};
use crate::parser;
use crate::roster::{self, CountryResolver};

/// What one run produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub races: usize,
    pub participants: usize,
    pub matched: usize,
    /// CSV and JSON files, counted separately
    pub files_written: usize,
}

impl RunSummary {
    fn start() -> Self {
        let now = Utc::now();
        Self {
            started_at: now,
            finished_at: now,
            races: 0,
            participants: 0,
            matched: 0,
            files_written: 0,
        }
    }

    pub fn elapsed(&self) -> chrono::TimeDelta {
        self.finished_at - self.started_at
    }
}

/// Progress bar for `steps` batches.
pub fn progress_bar(steps: u64) -> ProgressBar {
    let bar = ProgressBar::new(steps);
    // Static template, cannot fail to parse
    let style = ProgressStyle::with_template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("##-");
    bar.set_style(style);
    bar
}

/// End-to-end enrichment run over one roster
pub struct Pipeline<A: RunnerSearchApi = UtmbClient> {
    config: Config,
    service: EnrichmentService<A>,
    progress: ProgressBar,
}

impl Pipeline<UtmbClient> {
    /// Build a pipeline backed by the UTMB search client.
    pub fn from_config(config: Config) -> Result<Self> {
        let service = EnrichmentService::from_config(&config)?;
        Ok(Self::new(config, service))
    }
}

impl<A: RunnerSearchApi> Pipeline<A> {
    pub fn new(config: Config, service: EnrichmentService<A>) -> Self {
        Self {
            config,
            service,
            progress: ProgressBar::hidden(),
        }
    }

    /// Report progress on `progress`; its length is set by [`Pipeline::run`].
    pub fn with_progress(mut self, progress: ProgressBar) -> Self {
        self.progress = progress;
        self
    }

    /// Run every stage once.
    ///
    /// Any batch whose lookups fail for good aborts the run; files exported
    /// by earlier batches are left in place.
    pub async fn run(&self) -> Result<RunSummary> {
        let mut summary = RunSummary::start();
        let paths = &self.config.paths;

        let roster_path = paths.roster_path();
        let document = roster::load_roster(&roster_path)
            .with_context(format!("loading roster {}", roster_path.display()))?;
        let aliases =
            roster::load_country_aliases(&paths.country_aliases_path(), &paths.fifa_codes_path())?;
        let parser = parser::parser_for(
            &document,
            CountryResolver::new(aliases),
            &self.config.fixed_format,
        )?;
        tracing::info!(
            format = document.format_name(),
            races = document.races().len(),
            "Loaded roster"
        );

        let exporter = Exporter::new(paths.csv_dir(), paths.json_dir());
        let mut everyone: [Vec<Participant>; 2] = Default::default();

        self.progress.set_length(document.races().len() as u64 * 2);
        for race in document.races() {
            let participants = parser.parse_race(race);
            summary.races += 1;
            summary.participants += participants.len();

            let (men, women): (Vec<_>, Vec<_>) =
                participants.into_iter().partition(|p| p.sex == Sex::M);

            for (slot, (sex, batch)) in [(Sex::M, men), (Sex::F, women)].into_iter().enumerate() {
                self.progress.set_message(format!("{} {sex}", race.race));
                tracing::debug!(race = %race.race, %sex, size = batch.len(), "Enriching batch");

                let (mut enriched, stats) = self
                    .service
                    .enrich_batch(batch)
                    .await
                    .with_context(format!("enriching {} {sex}", race.race))?;
                summary.matched += stats.matched;

                let stem = race_file_stem(&race.race, sex);
                if exporter
                    .write(&mut enriched, &stem, &Column::PER_RACE_DROPPED)?
                    .is_some()
                {
                    summary.files_written += 2;
                }

                everyone[slot].extend(enriched);
                self.progress.inc(1);
            }
        }

        for (sex, participants) in Sex::ALL.into_iter().zip(everyone.iter_mut()) {
            if exporter
                .write(participants, &aggregate_file_stem(sex), &Column::AGGREGATE_DROPPED)?
                .is_some()
            {
                summary.files_written += 2;
            }
        }

        self.progress.finish_and_clear();
        summary.finished_at = Utc::now();
        tracing::info!(
            started_at = %summary.started_at.to_rfc3339(),
            races = summary.races,
            participants = summary.participants,
            matched = summary.matched,
            files = summary.files_written,
            "Run complete"
        );
        Ok(summary)
    }
}
