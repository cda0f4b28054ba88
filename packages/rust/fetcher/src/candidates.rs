//! Candidate URL generation and destination filename derivation.
//!
//! Both are pure string transforms: no network, no filesystem.

use stdpdf_shared::{CODE_PLACEHOLDER, DEFAULT_TEMPLATES};

/// Destination filename for a standard code.
///
/// Spaces and path separators become `-`, then `.pdf` is appended:
/// `GBZ/T 2.1-2019` -> `GBZ-T-2.1-2019.pdf`.
pub fn pdf_filename(code: &str) -> String {
    let name: String = code
        .chars()
        .map(|c| match c {
            ' ' | '/' | '\\' => '-',
            other => other,
        })
        .collect();
    format!("{name}.pdf")
}

/// Spellings of `code` that publishers use in file names, most common first.
///
/// 1. spaces removed (`GBZ188-2025`)
/// 2. spaces removed, `/T` rewritten to `-T` (`GBZ-T2.1-2019`)
/// 3. spaces replaced with `-` (`GBZ-188-2025`)
///
/// Duplicates are dropped, keeping the first occurrence.
pub fn code_variants(code: &str) -> Vec<String> {
    let compact = code.replace(' ', "");
    let compact_t = compact.replace("/T", "-T");
    let dashed = code.replace(' ', "-");

    let mut variants: Vec<String> = Vec::with_capacity(3);
    for v in [compact, compact_t, dashed] {
        if !v.is_empty() && !variants.contains(&v) {
            variants.push(v);
        }
    }
    variants
}

/// Produces the ordered list of URLs to try for a code.
pub trait CandidateSource {
    /// Candidate URLs for `code`, most likely first. Must be deterministic.
    fn candidates(&self, code: &str) -> Vec<String>;
}

impl<F> CandidateSource for F
where
    F: Fn(&str) -> Vec<String>,
{
    fn candidates(&self, code: &str) -> Vec<String> {
        self(code)
    }
}

/// Interpolates every code variant into a fixed list of URL templates.
#[derive(Debug, Clone)]
pub struct TemplateCandidates {
    templates: Vec<String>,
}

impl TemplateCandidates {
    /// Templates must contain the `{code}` placeholder.
    pub fn new(templates: Vec<String>) -> Self {
        Self { templates }
    }

    pub fn templates(&self) -> &[String] {
        &self.templates
    }
}

impl Default for TemplateCandidates {
    fn default() -> Self {
        Self::new(DEFAULT_TEMPLATES.iter().map(|t| t.to_string()).collect())
    }
}

impl CandidateSource for TemplateCandidates {
    fn candidates(&self, code: &str) -> Vec<String> {
        let mut urls: Vec<String> = Vec::new();
        for variant in code_variants(code) {
            for template in &self.templates {
                let url = template.replace(CODE_PLACEHOLDER, &variant);
                if !urls.contains(&url) {
                    urls.push(url);
                }
            }
        }
        urls
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filename_replaces_spaces() {
        assert_eq!(pdf_filename("GBZ 188-2025"), "GBZ-188-2025.pdf");
    }

    #[test]
    fn filename_replaces_spaces_and_slashes() {
        assert_eq!(pdf_filename("GBZ/T 2.1-2019"), "GBZ-T-2.1-2019.pdf");
        assert_eq!(pdf_filename("WS\\T 1-2020"), "WS-T-1-2020.pdf");
    }

    #[test]
    fn filename_is_deterministic() {
        let code = "GBZ/T 229.1-2010";
        assert_eq!(pdf_filename(code), pdf_filename(code));
    }

    #[test]
    fn variants_for_plain_code() {
        assert_eq!(
            code_variants("GBZ 188-2025"),
            vec!["GBZ188-2025".to_string(), "GBZ-188-2025".to_string()]
        );
    }

    #[test]
    fn variants_for_recommended_code() {
        assert_eq!(
            code_variants("GBZ/T 2.1-2019"),
            vec![
                "GBZ/T2.1-2019".to_string(),
                "GBZ-T2.1-2019".to_string(),
                "GBZ/T-2.1-2019".to_string(),
            ]
        );
    }

    #[test]
    fn variants_for_code_without_spaces() {
        assert_eq!(code_variants("GBZ1-2010"), vec!["GBZ1-2010".to_string()]);
        assert!(code_variants("").is_empty());
    }

    #[test]
    fn default_templates_compact_variant_first() {
        let source = TemplateCandidates::default();
        let urls = source.candidates("GBZ 188-2025");

        assert_eq!(urls.len(), DEFAULT_TEMPLATES.len() * 2);
        assert_eq!(
            urls[0],
            "https://www.nhc.gov.cn/ewebeditor/uploadfile/2024/GBZ188-2025.pdf"
        );
        assert_eq!(
            urls[3],
            "https://niohp.chinacdc.cn/zyysjk/zywsbzml/P020GBZ188-2025.pdf"
        );
        assert_eq!(
            urls[DEFAULT_TEMPLATES.len()],
            "https://www.nhc.gov.cn/ewebeditor/uploadfile/2024/GBZ-188-2025.pdf"
        );
    }

    #[test]
    fn candidates_are_pure_and_finite() {
        let source = TemplateCandidates::default();
        let first = source.candidates("GBZ/T 229.1-2010");
        let second = source.candidates("GBZ/T 229.1-2010");

        assert!(!first.is_empty());
        assert_eq!(first, second);
        assert!(first.len() <= DEFAULT_TEMPLATES.len() * 3);
    }

    #[test]
    fn duplicate_urls_are_dropped() {
        let source = TemplateCandidates::new(vec![
            "https://a.example/{code}.pdf".into(),
            "https://a.example/{code}.pdf".into(),
        ]);
        assert_eq!(
            source.candidates("GBZ1-2010"),
            vec!["https://a.example/GBZ1-2010.pdf".to_string()]
        );
    }

    #[test]
    fn closures_are_candidate_sources() {
        let fixed = |_: &str| vec!["http://127.0.0.1/only.pdf".to_string()];
        assert_eq!(fixed.candidates("anything").len(), 1);
    }
}
