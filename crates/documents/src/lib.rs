//! Policy certificates and expiry reports.
//!
//! Documents are rendered to HTML from embedded Tera templates and converted
//! with `wkhtmltopdf` when it is available. Without a converter, or when
//! conversion fails, the HTML is written where the PDF would have gone.

pub mod views;

use std::path::{Path, PathBuf};
use std::process::Stdio;

use async_trait::async_trait;
use chrono::{Local, NaiveDate};
use tera::{Context, Tera};
use tokio::process::Command;
use tracing::{info, warn};

use mmi_core::config::DocumentsConfig;
use mmi_core::domain::quotation::Quotation;
use mmi_core::errors::DocumentError;
use mmi_core::ports::DocumentService;

use crate::views::{CertificateView, ReportRow};

pub const CERTIFICATE_TEMPLATE: &str = "certificate.html.tera";
pub const EXPIRING_REPORT_TEMPLATE: &str = "expiring_report.html.tera";
pub const COMPANY_NAME: &str = "Munster Motors Insurance";
pub const COMPANY_SHORT_NAME: &str = "MMI";

type Clock = Box<dyn Fn() -> NaiveDate + Send + Sync>;

/// Where a document ended up and in which format.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Published {
    Pdf(PathBuf),
    Html(PathBuf),
}

impl Published {
    pub fn path(&self) -> &Path {
        match self {
            Self::Pdf(path) | Self::Html(path) => path,
        }
    }

    pub fn into_path(self) -> PathBuf {
        match self {
            Self::Pdf(path) | Self::Html(path) => path,
        }
    }
}

pub struct DocumentGenerator {
    tera: Tera,
    output_dir: PathBuf,
    wkhtmltopdf_path: Option<PathBuf>,
    clock: Clock,
}

impl DocumentGenerator {
    /// Generator writing under `output_dir`, converting with whatever
    /// `wkhtmltopdf` is found on `PATH`.
    pub fn new(output_dir: impl Into<PathBuf>) -> Result<Self, DocumentError> {
        let wkhtmltopdf_path = which::which("wkhtmltopdf").ok();
        match &wkhtmltopdf_path {
            Some(path) => info!(
                event_name = "documents.converter.found",
                path = %path.display(),
                "wkhtmltopdf found"
            ),
            None => warn!(
                event_name = "documents.converter.missing",
                "wkhtmltopdf not found in PATH - documents will be written as HTML"
            ),
        }

        Ok(Self {
            tera: embedded_templates()?,
            output_dir: output_dir.into(),
            wkhtmltopdf_path,
            clock: Box::new(|| Local::now().date_naive()),
        })
    }

    pub fn from_config(config: &DocumentsConfig) -> Result<Self, DocumentError> {
        let generator = Self::new(config.output_dir.clone())?;
        Ok(match &config.wkhtmltopdf_path {
            Some(path) => generator.with_converter(Some(path.clone())),
            None => generator,
        })
    }

    /// Overrides converter discovery. `None` forces HTML output.
    pub fn with_converter(mut self, wkhtmltopdf_path: Option<PathBuf>) -> Self {
        self.wkhtmltopdf_path = wkhtmltopdf_path;
        self
    }

    pub fn with_clock(mut self, clock: impl Fn() -> NaiveDate + Send + Sync + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    pub fn converter(&self) -> Option<&Path> {
        self.wkhtmltopdf_path.as_deref()
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn certificate_path(&self, policy_number: i64) -> PathBuf {
        self.output_dir.join("policies").join(format!("Policy#{policy_number}.pdf"))
    }

    pub fn report_path(&self, label: &str, generated_on: NaiveDate) -> PathBuf {
        let stamp = generated_on.format("%y-%m-%d");
        self.output_dir.join("reports").join(format!("{label} - {stamp}.pdf"))
    }

    pub fn render_certificate(&self, policy: &Quotation) -> Result<String, DocumentError> {
        let view = CertificateView::from_policy(policy)?;
        let mut context = base_context();
        context.insert("policy", &view);
        context.insert("issued_on", &(self.clock)().format("%d/%m/%Y").to_string());
        self.render(CERTIFICATE_TEMPLATE, &context)
    }

    pub fn render_expiring_report(
        &self,
        quotations: &[Quotation],
        label: &str,
    ) -> Result<String, DocumentError> {
        let rows: Vec<ReportRow> = quotations.iter().map(ReportRow::from_quotation).collect();
        let mut context = base_context();
        context.insert("report_label", label);
        context.insert("rows", &rows);
        context.insert("generated_on", &(self.clock)().format("%d/%m/%Y").to_string());
        self.render(EXPIRING_REPORT_TEMPLATE, &context)
    }

    pub async fn publish_certificate(
        &self,
        policy: &Quotation,
    ) -> Result<Published, DocumentError> {
        let policy_number = policy.id.ok_or(DocumentError::MissingPolicyNumber)?;
        let html = self.render_certificate(policy)?;
        let published = self.publish(&html, &self.certificate_path(policy_number.0)).await?;
        info!(
            event_name = "documents.certificate.written",
            policy_id = %policy_number,
            path = %published.path().display(),
            "certificate written"
        );
        Ok(published)
    }

    pub async fn publish_expiring_report(
        &self,
        quotations: &[Quotation],
        label: &str,
    ) -> Result<Published, DocumentError> {
        let html = self.render_expiring_report(quotations, label)?;
        let target = self.report_path(label, (self.clock)());
        let published = self.publish(&html, &target).await?;
        info!(
            event_name = "documents.report.written",
            report = label,
            rows = quotations.len(),
            path = %published.path().display(),
            "report written"
        );
        Ok(published)
    }

    fn render(&self, template: &str, context: &Context) -> Result<String, DocumentError> {
        self.tera
            .render(template, context)
            .map_err(|error| DocumentError::Template(error.to_string()))
    }

    async fn publish(&self, html: &str, pdf_path: &Path) -> Result<Published, DocumentError> {
        if let Some(parent) = pdf_path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|source| DocumentError::Write { path: parent.to_path_buf(), source })?;
        }

        if let Some(wkhtmltopdf) = &self.wkhtmltopdf_path {
            match convert_html_to_pdf(html, wkhtmltopdf, pdf_path).await {
                Ok(()) => return Ok(Published::Pdf(pdf_path.to_path_buf())),
                Err(error) => warn!(
                    event_name = "documents.conversion.failed",
                    error = %error,
                    "PDF conversion failed, falling back to HTML"
                ),
            }
        }

        let html_path = pdf_path.with_extension("html");
        tokio::fs::write(&html_path, html)
            .await
            .map_err(|source| DocumentError::Write { path: html_path.clone(), source })?;
        Ok(Published::Html(html_path))
    }
}

#[async_trait]
impl DocumentService for DocumentGenerator {
    async fn create_certificate(&self, policy: &Quotation) -> Result<PathBuf, DocumentError> {
        self.publish_certificate(policy).await.map(Published::into_path)
    }

    async fn create_expiring_report(
        &self,
        quotations: &[Quotation],
        label: &str,
    ) -> Result<PathBuf, DocumentError> {
        self.publish_expiring_report(quotations, label).await.map(Published::into_path)
    }
}

fn embedded_templates() -> Result<Tera, DocumentError> {
    let mut tera = Tera::default();
    tera.autoescape_on(vec![".html.tera"]);
    tera.add_raw_templates(vec![
        (CERTIFICATE_TEMPLATE, include_str!("../../../templates/documents/certificate.html.tera")),
        (
            EXPIRING_REPORT_TEMPLATE,
            include_str!("../../../templates/documents/expiring_report.html.tera"),
        ),
    ])
    .map_err(|error| DocumentError::Template(error.to_string()))?;
    Ok(tera)
}

fn base_context() -> Context {
    let mut context = Context::new();
    context.insert("company_name", COMPANY_NAME);
    context.insert("company_short_name", COMPANY_SHORT_NAME);
    context
}

async fn convert_html_to_pdf(
    html: &str,
    wkhtmltopdf: &Path,
    pdf_path: &Path,
) -> Result<(), DocumentError> {
    let html_path = std::env::temp_dir().join(format!("mmi_{}.html", uuid::Uuid::new_v4()));
    tokio::fs::write(&html_path, html).await?;

    let output = Command::new(wkhtmltopdf)
        .arg("--page-size")
        .arg("A4")
        .arg("--margin-top")
        .arg("10mm")
        .arg("--margin-bottom")
        .arg("10mm")
        .arg("--encoding")
        .arg("utf-8")
        .arg("--quiet")
        .arg(&html_path)
        .arg(pdf_path)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .await;
    let _ = tokio::fs::remove_file(&html_path).await;

    let output = output?;
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(DocumentError::Conversion(stderr.trim().to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use chrono::NaiveDate;
    use tempfile::TempDir;

    use mmi_core::domain::customer::Customer;
    use mmi_core::domain::quotation::{Quotation, QuotationId};
    use mmi_core::domain::rating::{County, EmissionsClass, InsuranceCategory, Sex};
    use mmi_core::errors::DocumentError;
    use mmi_core::ports::DocumentService;

    use super::{DocumentGenerator, Published};

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 19).expect("valid date")
    }

    fn generator(dir: &TempDir) -> DocumentGenerator {
        DocumentGenerator::new(dir.path())
            .expect("templates load")
            .with_converter(None)
            .with_clock(today)
    }

    fn policy() -> Quotation {
        Quotation {
            id: Some(QuotationId(41)),
            sex: Some(Sex::Female),
            age: 42,
            county: Some(County::Kerry),
            model: "Yaris".to_string(),
            emissions: Some(EmissionsClass::Low),
            insurance_category: Some(InsuranceCategory::FullyComprehensive),
            total_cost: 1235,
            valid_until: NaiveDate::from_ymd_opt(2027, 10, 19),
            is_policy: true,
            customer: Some(Customer {
                first_name: "Aisling".to_string(),
                surname: "O'Brien".to_string(),
                phone_number: "0861112222".to_string(),
                ..Customer::default()
            }),
        }
    }

    #[test]
    fn document_paths_follow_naming_convention() {
        let generator = DocumentGenerator::new("/srv/mmi").expect("templates load");

        assert_eq!(
            generator.certificate_path(41),
            PathBuf::from("/srv/mmi/policies/Policy#41.pdf")
        );
        assert_eq!(
            generator.report_path("Policies Expiring (Next 30 Days)", today()),
            PathBuf::from("/srv/mmi/reports/Policies Expiring (Next 30 Days) - 26-10-19.pdf")
        );
    }

    #[test]
    fn certificate_shows_term_and_customer_letter() {
        let dir = TempDir::new().expect("temp dir");
        let html = generator(&dir).render_certificate(&policy()).expect("render");

        assert!(html.contains("Policy Number:</th><td>41</td>"));
        assert!(html.contains("Toyota-Yaris"));
        assert!(html.contains("€1235"));
        assert!(html.contains("Policy Start Date:</th><td>19/10/2026</td>"));
        assert!(html.contains("Policy End Date:</th><td>19/10/2027</td>"));
        assert!(html.contains("Dear Aisling O&#x27;Brien,"));
    }

    #[test]
    fn report_lists_every_row() {
        let dir = TempDir::new().expect("temp dir");
        let mut second = policy();
        second.id = Some(QuotationId(42));
        second.customer = None;

        let html = generator(&dir)
            .render_expiring_report(&[policy(), second], "Policies Expiring (Next 30 Days)")
            .expect("render");

        assert!(html.contains("<td>41</td>"));
        assert!(html.contains("<td>42</td>"));
        assert!(html.contains("0861112222"));
        assert!(html.contains("2 record(s)"));
        assert!(!html.contains("Nothing expires"));
    }

    #[tokio::test]
    async fn without_converter_certificate_is_written_as_html() {
        let dir = TempDir::new().expect("temp dir");
        let generator = generator(&dir);

        let published = generator.publish_certificate(&policy()).await.expect("publish");

        let expected = dir.path().join("policies").join("Policy#41.html");
        assert_eq!(published, Published::Html(expected.clone()));
        let written = std::fs::read_to_string(expected).expect("certificate written");
        assert!(written.contains("Insurance Certificate"));
    }

    #[tokio::test]
    async fn failing_converter_falls_back_to_html() {
        let dir = TempDir::new().expect("temp dir");
        let generator =
            generator(&dir).with_converter(Some(dir.path().join("missing-wkhtmltopdf")));

        let path = generator
            .create_expiring_report(&[], "Quotations Expiring (Next 3 Days)")
            .await
            .expect("report");

        assert_eq!(
            path,
            dir.path().join("reports").join("Quotations Expiring (Next 3 Days) - 26-10-19.html")
        );
        let written = std::fs::read_to_string(path).expect("report written");
        assert!(written.contains("Nothing expires in this window."));
    }

    #[tokio::test]
    async fn unsaved_policies_get_no_certificate() {
        let dir = TempDir::new().expect("temp dir");
        let mut unsaved = policy();
        unsaved.id = None;

        let error = generator(&dir).create_certificate(&unsaved).await.expect_err("no id");

        assert!(matches!(error, DocumentError::MissingPolicyNumber));
        assert!(!dir.path().join("policies").exists());
    }
}
