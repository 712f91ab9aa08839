//! Report composition: message text and deterministic filenames.
//!
//! Filenames follow the fixed `<Prefix>-<MM>-<YY>.pdf` template, resolved
//! against the configured reports directory. The PDF itself is generated
//! elsewhere; this only addresses and captions it.

use crate::domain::{DispatchOutcome, DomainError, ReportRequest};
use crate::usecases::Dispatcher;
use chrono::{Datelike, NaiveDate};
use std::path::PathBuf;
use tracing::{error, info};

const WEEKLY_PREFIX: &str = "RelatorioMetaRede";
const BONUS_PREFIX: &str = "RelatorioBonificacoesAnual";

/// Lowercase pt-BR month names, matching the locale output the report
/// recipients expect.
const MONTH_NAMES_PT_BR: [&str; 12] = [
    "janeiro",
    "fevereiro",
    "março",
    "abril",
    "maio",
    "junho",
    "julho",
    "agosto",
    "setembro",
    "outubro",
    "novembro",
    "dezembro",
];

/// pt-BR name for a 1-based month number.
pub fn month_name_pt_br(month: u32) -> &'static str {
    MONTH_NAMES_PT_BR[(month as usize - 1) % 12]
}

/// `<prefix>-<MM>-<YY>.pdf`: zero-padded month, last two year digits.
pub fn report_file_name(prefix: &str, month: u32, year: i32) -> String {
    format!("{}-{:02}-{:02}.pdf", prefix, month, year.rem_euclid(100))
}

/// Builds report requests and hands them to the dispatcher.
pub struct ReportComposer {
    dispatcher: Dispatcher,
    destination: String,
    reports_dir: PathBuf,
}

impl ReportComposer {
    pub fn new(
        dispatcher: Dispatcher,
        destination: impl Into<String>,
        reports_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            dispatcher,
            destination: destination.into(),
            reports_dir: reports_dir.into(),
        }
    }

    /// Weekly "Meta da Rede" report for the month containing `today`.
    pub fn weekly_request(&self, today: NaiveDate) -> ReportRequest {
        let message = format!(
            "Segue o relatório de atualização semanal, da Meta da Rede, referente a {} de {}.",
            month_name_pt_br(today.month()),
            today.year()
        );
        let file = self
            .reports_dir
            .join(report_file_name(WEEKLY_PREFIX, today.month(), today.year()));
        ReportRequest { message, file }
    }

    /// Bonus report. Four positional args `[start, end, refMonth, refYear]`
    /// select the annual period; with fewer, falls back to the monthly
    /// report for the month containing `today`.
    pub fn bonus_request(
        &self,
        args: &[String],
        today: NaiveDate,
    ) -> Result<ReportRequest, DomainError> {
        if args.len() >= 4 {
            let start = &args[0];
            let end = &args[1];
            let month: u32 = args[2].parse().map_err(|_| {
                DomainError::InvalidRequest(format!("invalid reference month: {:?}", args[2]))
            })?;
            if !(1..=12).contains(&month) {
                return Err(DomainError::InvalidRequest(format!(
                    "reference month out of range: {month}"
                )));
            }
            let year: i32 = args[3].parse().map_err(|_| {
                DomainError::InvalidRequest(format!("invalid reference year: {:?}", args[3]))
            })?;

            let message = format!(
                "Segue o relatório anual de bonificações referente ao período de {start} até {end}."
            );
            let file = self
                .reports_dir
                .join(report_file_name(BONUS_PREFIX, month, year));
            return Ok(ReportRequest { message, file });
        }

        let message = format!(
            "Segue o relatório mensal de bonificações referente a {} de {}.",
            month_name_pt_br(today.month()),
            today.year()
        );
        let file = self
            .reports_dir
            .join(report_file_name(BONUS_PREFIX, today.month(), today.year()));
        Ok(ReportRequest { message, file })
    }

    /// Send the report file with the composed message as its caption to the
    /// configured destination group. No retry on failure; the operator
    /// re-runs the entrypoint manually.
    pub async fn send(&self, request: &ReportRequest) -> DispatchOutcome {
        info!(
            group = %self.destination,
            file = %request.file.display(),
            "sending report"
        );
        let outcome = self
            .dispatcher
            .send_file(&self.destination, &request.file, Some(&request.message))
            .await;
        if !outcome.delivered {
            error!("failed to send the report file");
        }
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::whatsapp::MockTransport;
    use crate::ports::ChatTransport;
    use crate::usecases::Session;
    use std::sync::Arc;
    use std::time::Duration;

    const GROUP: &str = "558589578930-1501162626@g.us";

    fn composer() -> ReportComposer {
        composer_with(&Arc::new(MockTransport::ready())).1
    }

    fn composer_with(transport: &Arc<MockTransport>) -> (Arc<Session>, ReportComposer) {
        let dyn_transport: Arc<dyn ChatTransport> = transport.clone();
        let session = Arc::new(Session::new(dyn_transport, Duration::from_secs(1)));
        let composer = ReportComposer::new(
            Dispatcher::new(Arc::clone(&session)),
            GROUP,
            PathBuf::from("Relatorio"),
        );
        (session, composer)
    }

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    #[test]
    fn weekly_filename_follows_the_fixed_template() {
        let request = composer().weekly_request(date(2025, 3, 5));
        assert_eq!(
            request.file.file_name().unwrap(),
            "RelatorioMetaRede-03-25.pdf"
        );
        assert!(request.file.starts_with("Relatorio"));
    }

    #[test]
    fn weekly_message_names_the_month_in_pt_br() {
        let request = composer().weekly_request(date(2025, 3, 5));
        assert_eq!(
            request.message,
            "Segue o relatório de atualização semanal, da Meta da Rede, referente a março de 2025."
        );
    }

    #[test]
    fn bonus_with_four_args_composes_the_annual_period() {
        let args: Vec<String> = ["agosto/2024", "julho/2025", "07", "2025"]
            .iter()
            .map(ToString::to_string)
            .collect();
        let request = composer().bonus_request(&args, date(2025, 7, 1)).unwrap();

        assert_eq!(
            request.message,
            "Segue o relatório anual de bonificações referente ao período de agosto/2024 até julho/2025."
        );
        assert_eq!(
            request.file.file_name().unwrap(),
            "RelatorioBonificacoesAnual-07-25.pdf"
        );
    }

    #[test]
    fn bonus_without_args_falls_back_to_the_current_month() {
        let request = composer().bonus_request(&[], date(2025, 7, 15)).unwrap();

        assert_eq!(
            request.message,
            "Segue o relatório mensal de bonificações referente a julho de 2025."
        );
        assert_eq!(
            request.file.file_name().unwrap(),
            "RelatorioBonificacoesAnual-07-25.pdf"
        );
    }

    #[test]
    fn bonus_rejects_unparseable_reference_args() {
        let args: Vec<String> = ["a", "b", "month", "2025"]
            .iter()
            .map(ToString::to_string)
            .collect();
        let err = composer().bonus_request(&args, date(2025, 1, 1)).unwrap_err();
        assert!(matches!(err, DomainError::InvalidRequest(_)));

        let args: Vec<String> = ["a", "b", "13", "2025"]
            .iter()
            .map(ToString::to_string)
            .collect();
        let err = composer().bonus_request(&args, date(2025, 1, 1)).unwrap_err();
        assert!(matches!(err, DomainError::InvalidRequest(_)));
    }

    #[test]
    fn month_numbers_are_zero_padded_and_years_truncated() {
        assert_eq!(
            report_file_name("RelatorioMetaRede", 1, 2024),
            "RelatorioMetaRede-01-24.pdf"
        );
        assert_eq!(
            report_file_name("RelatorioBonificacoesAnual", 12, 2030),
            "RelatorioBonificacoesAnual-12-30.pdf"
        );
    }

    #[tokio::test]
    async fn send_reports_missing_file_without_touching_the_transport() {
        let transport = Arc::new(MockTransport::ready());
        let (session, composer) = composer_with(&transport);
        session.initialize().await.unwrap();

        let request = composer.weekly_request(date(2025, 3, 5));
        let outcome = composer.send(&request).await;

        assert!(!outcome.delivered);
        assert!(matches!(outcome.error, Some(DomainError::MissingFile(_))));
        assert_eq!(transport.media_count(), 0);
    }
}
