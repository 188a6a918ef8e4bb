// src/extractors/table.rs

// --- Imports ---
use crate::document::models::{Table, TableId};
use crate::utils::error::ExtractError;
use once_cell::sync::Lazy;
use regex::Regex;

// --- Constants ---
/// Sub-header that opens the row data of every table
pub const DESCRIPTION_HEADER: &str = "Descrição da categoria";
/// Source note that follows every table in the document
pub const SOURCE_MARKER: &str = "Fonte:";
/// Running footer printed on each page of the document
pub const PAGE_FOOTER: &str = "Padrão TISS - Componente Organizacional";

/// Copyright year from the page footer, picked up as a digit run
const FOOTER_YEAR: &str = "2021";
/// Pages the Quadro 31 rows are printed on
const TABLE_31_PAGES: [u32; 4] = [116, 117, 118, 119];
/// Quadro 32 has no usable end marker, so its row count is fixed
const TABLE_32_ROWS: usize = 3;

// --- Regex Patterns (Lazy Static) ---
static CODE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[0-9]+").expect("Failed to compile CODE_RE")
});

// Letters (with the Portuguese accented set), commas, parentheses, hyphen, en-dash and spaces
static DESCRIPTION_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[a-zA-ZçÇãÃáÁàÀâÂõÕóÓôÔéÉêÊúÚûÛíÍ,()\-– ]+")
        .expect("Failed to compile DESCRIPTION_RE")
});

// --- Main Extractor Structure ---
pub struct TableExtractor<'a> {
    document: &'a str,
}

impl<'a> TableExtractor<'a> {
    pub fn new(document: &'a str) -> Self {
        Self { document }
    }

    /// Extracts a table by its printed number (30, 31 or 32).
    pub fn get_table(&self, table_number: u32) -> Result<Table, ExtractError> {
        let id = TableId::try_from(table_number)?;
        self.extract_table(id)
    }

    /// Locates, parses and cleans up one table.
    pub fn extract_table(&self, id: TableId) -> Result<Table, ExtractError> {
        tracing::info!("Extracting {} ({})", id, id.title());

        let region = extract_region(self.document, id.start_marker())?;
        tracing::debug!("{} region is {} bytes", id, region.len());

        let (codes, descriptions) = parse_columns(&region);
        tracing::debug!("{} parsed {} codes and {} descriptions before cleanup", id, codes.len(), descriptions.len());

        let table = match id {
            TableId::Demandante => Table {
                id,
                codes,
                descriptions: drop_empty(descriptions),
            },
            TableId::CategoriaTiss => {
                let codes = drop_page_numbers(drop_year_tokens(codes), &TABLE_31_PAGES);
                Table {
                    id,
                    codes,
                    descriptions: drop_footer_descriptions(descriptions),
                }
            }
            TableId::TipoSolicitacao => {
                let descriptions = drop_empty(descriptions);
                if codes.len() < TABLE_32_ROWS || descriptions.len() < TABLE_32_ROWS {
                    return Err(ExtractError::IncompleteTable {
                        table: id.number(),
                        expected: TABLE_32_ROWS,
                        found: codes.len().min(descriptions.len()),
                    });
                }
                Table {
                    id,
                    codes: codes.into_iter().take(TABLE_32_ROWS).collect(),
                    descriptions: descriptions.into_iter().take(TABLE_32_ROWS).collect(),
                }
            }
        };

        if table.codes.len() != table.descriptions.len() {
            tracing::error!("{} columns do not line up: {:?} / {:?}", id, table.codes, table.descriptions);
            return Err(ExtractError::ColumnMismatch {
                table: id.number(),
                codes: table.codes.len(),
                descriptions: table.descriptions.len(),
            });
        }

        if table.is_empty() {
            tracing::warn!("{} has no rows", id);
        }
        tracing::info!("{}: {} rows", id, table.len());
        Ok(table)
    }

    /// Region text of a table, exposed for debug dumps.
    pub fn region(&self, id: TableId) -> Result<String, ExtractError> {
        extract_region(self.document, id.start_marker())
    }
}

// --- Region Segmentation ---

/// Returns the flattened text between the table's description header and the next source note.
pub fn extract_region(document: &str, start_marker: &str) -> Result<String, ExtractError> {
    let after_start = find_after(document, start_marker)?;
    let after_header = find_after(after_start, DESCRIPTION_HEADER)?;
    let end = after_header.find(SOURCE_MARKER).ok_or_else(|| ExtractError::RegionNotFound {
        marker: SOURCE_MARKER.to_string(),
    })?;

    Ok(normalize_whitespace(&after_header[..end]))
}

fn find_after<'t>(text: &'t str, marker: &str) -> Result<&'t str, ExtractError> {
    text.find(marker)
        .map(|pos| &text[pos + marker.len()..])
        .ok_or_else(|| ExtractError::RegionNotFound {
            marker: marker.to_string(),
        })
}

/// Flattens hard-wrapped text: line breaks inside a space-separated token are deleted
/// (re-joining words and numbers split across lines), then tokens are joined by single spaces.
fn normalize_whitespace(text: &str) -> String {
    text.split(' ')
        .map(|token| token.replace(['\n', '\r'], ""))
        .filter(|token| !token.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

// --- Column Parsing ---

/// Splits region text into its digit runs (codes) and text runs (descriptions), in order.
pub fn parse_columns(region: &str) -> (Vec<String>, Vec<String>) {
    // A trailing source note is not row data
    let region = match region.find(SOURCE_MARKER) {
        Some(end) => &region[..end],
        None => region,
    };

    let codes = CODE_RE
        .find_iter(region)
        .map(|m| m.as_str().to_string())
        .collect();

    let descriptions = DESCRIPTION_RE
        .find_iter(region)
        .map(|m| m.as_str().trim().to_string())
        .collect();

    (codes, descriptions)
}

// --- Cleanup Filters ---

fn drop_empty(descriptions: Vec<String>) -> Vec<String> {
    descriptions.into_iter().filter(|d| !d.is_empty()).collect()
}

/// Removes the footer year that the digit split reads as a code.
pub fn drop_year_tokens(codes: Vec<String>) -> Vec<String> {
    codes.into_iter().filter(|code| code != FOOTER_YEAR).collect()
}

/// Removes page numbers injected between rows. A token whose value is one of `pages`
/// is kept only when it continues the sequence, i.e. equals the previously kept code + 1.
/// Single left-to-right pass, compared against the last *retained* code.
pub fn drop_page_numbers(codes: Vec<String>, pages: &[u32]) -> Vec<String> {
    let mut kept: Vec<String> = Vec::with_capacity(codes.len());

    for code in codes {
        let value = code.parse::<u32>().ok();
        let is_page = value.is_some_and(|v| pages.contains(&v));

        if is_page {
            let previous = kept.last().and_then(|c| c.parse::<u32>().ok());
            let continues = matches!((previous, value), (Some(p), Some(v)) if p.checked_add(1) == Some(v));
            if !continues {
                tracing::debug!("Dropping page number token {} (previous code {:?})", code, previous);
                continue;
            }
        }

        kept.push(code);
    }

    kept
}

/// Removes page footer text and empty runs from the description column.
pub fn drop_footer_descriptions(descriptions: Vec<String>) -> Vec<String> {
    descriptions
        .into_iter()
        .filter(|d| !d.is_empty() && !d.contains(PAGE_FOOTER))
        .collect()
}

// --- Tests ---
#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Text laid out the way the PDF-to-text step renders the source document:
    /// captions, a repeated running footer, page numbers between rows and a hard-wrapped word.
    pub(crate) const SAMPLE_DOCUMENT: &str = "Padrão TISS - Componente Organizacional \n\
Quadro 30 – Tabela de tipo de demandante \n\
Código Descrição da categoria \n\
1 Operadora \n\
2 Prestador de serviços de saúde \n\
3 Beneficiário \n\
Fonte: Elaboração própria. \n\
Quadro 31 – Tabela de categoria do Padrão TISS \n\
Código Descrição da categoria \n\
1 Consulta \n\
2 Exame ambulatorial \n\
3 Terapias \n\
117 \n\
Padrão TISS - Componente Organizacional novembro de 2021 \n\
4 Interna\nção \n\
5 Odontologia \n\
Fonte: Elaboração própria. \n\
Quadro 32 – Tabela de tipo de solicitação \n\
Código Descrição da categoria \n\
1 Autorização \n\
2 Elegibilidade \n\
3 Reembolso \n\
121 \n\
Padrão TISS - Componente Organizacional \n\
Quadro 33 – Tabela de status \n\
Código Descrição da categoria \n\
1 Outra \n\
Fonte: Elaboração própria. \n";

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_region_is_bounded_and_flattened() {
        let region = extract_region(SAMPLE_DOCUMENT, TableId::Demandante.start_marker()).unwrap();
        assert_eq!(region, "1 Operadora 2 Prestador de serviços de saúde 3 Beneficiário");
    }

    #[test]
    fn test_region_rejoins_wrapped_words() {
        let region = extract_region(SAMPLE_DOCUMENT, TableId::CategoriaTiss.start_marker()).unwrap();
        assert!(region.contains("4 Internação 5 Odontologia"), "got: {}", region);
        assert!(!region.contains('\n'));
    }

    #[test]
    fn test_region_without_source_marker_fails() {
        let text = "Quadro 30 – Tabela de tipo de demandante Descrição da categoria 1 Operadora";
        let result = extract_region(text, TableId::Demandante.start_marker());

        match result {
            Err(ExtractError::RegionNotFound { marker }) => assert_eq!(marker, SOURCE_MARKER),
            other => panic!("expected RegionNotFound, got {:?}", other),
        }
    }

    #[test]
    fn test_region_without_start_or_header_fails() {
        assert!(matches!(
            extract_region("nothing here Fonte:", "Quadro 30"),
            Err(ExtractError::RegionNotFound { marker }) if marker == "Quadro 30"
        ));
        assert!(matches!(
            extract_region("Quadro 30 1 A Fonte:", "Quadro 30"),
            Err(ExtractError::RegionNotFound { marker }) if marker == DESCRIPTION_HEADER
        ));
    }

    #[test]
    fn test_parse_columns_splits_codes_and_descriptions() {
        let (codes, descriptions) = parse_columns("1 Demandante A 2 Demandante B Fonte: ...");
        assert_eq!(codes, strings(&["1", "2"]));
        assert_eq!(descriptions, strings(&["Demandante A", "Demandante B"]));
    }

    #[test]
    fn test_parse_columns_keeps_punctuation_in_descriptions() {
        let (codes, descriptions) = parse_columns("10 Honorários (equipe), ajuste – pós-operatório 11 Órtese");
        assert_eq!(codes, strings(&["10", "11"]));
        assert_eq!(
            descriptions,
            strings(&["Honorários (equipe), ajuste – pós-operatório", "Órtese"])
        );
    }

    #[test]
    fn test_table_30() {
        let table = TableExtractor::new(SAMPLE_DOCUMENT).get_table(30).unwrap();
        assert_eq!(table.codes, strings(&["1", "2", "3"]));
        assert_eq!(
            table.descriptions,
            strings(&["Operadora", "Prestador de serviços de saúde", "Beneficiário"])
        );
    }

    #[test]
    fn test_table_31_removes_page_artifacts() {
        let table = TableExtractor::new(SAMPLE_DOCUMENT).get_table(31).unwrap();
        assert_eq!(table.codes, strings(&["1", "2", "3", "4", "5"]));
        assert_eq!(
            table.descriptions,
            strings(&["Consulta", "Exame ambulatorial", "Terapias", "Internação", "Odontologia"])
        );
        assert!(!table.codes.iter().any(|c| c == "2021"));
        assert!(!table.descriptions.iter().any(|d| d.contains(PAGE_FOOTER)));
    }

    #[test]
    fn test_table_32_is_truncated_to_three_rows() {
        let table = TableExtractor::new(SAMPLE_DOCUMENT).get_table(32).unwrap();
        assert_eq!(table.codes, strings(&["1", "2", "3"]));
        assert_eq!(table.descriptions, strings(&["Autorização", "Elegibilidade", "Reembolso"]));
    }

    #[test]
    fn test_table_32_parses_more_runs_than_it_keeps() {
        let region = extract_region(SAMPLE_DOCUMENT, TableId::TipoSolicitacao.start_marker()).unwrap();
        let (codes, descriptions) = parse_columns(&region);
        assert!(codes.len() > 3, "codes: {:?}", codes);
        assert!(descriptions.iter().filter(|d| !d.is_empty()).count() > 3, "descriptions: {:?}", descriptions);
    }

    #[test]
    fn test_table_32_with_too_few_rows_fails() {
        let text = "Quadro 32 – Tabela de tipo de solicitação Descrição da categoria 1 Autorização 2 Elegibilidade Fonte:";
        let result = TableExtractor::new(text).get_table(32);
        assert!(matches!(
            result,
            Err(ExtractError::IncompleteTable { table: 32, expected: 3, found: 2 })
        ));
    }

    #[test]
    fn test_unsupported_table() {
        let result = TableExtractor::new(SAMPLE_DOCUMENT).get_table(99);
        assert!(matches!(result, Err(ExtractError::UnsupportedTable(99))));
    }

    #[test]
    fn test_columns_line_up_for_every_table() {
        let extractor = TableExtractor::new(SAMPLE_DOCUMENT);
        for id in TableId::ALL {
            let table = extractor.extract_table(id).unwrap();
            assert_eq!(table.codes.len(), table.descriptions.len(), "{}", id);
        }
    }

    #[test]
    fn test_mismatched_columns_fail() {
        // "2021" is only dropped for Quadro 31, so here it leaves an extra code
        let text = "Quadro 30 – Tabela de tipo de demandante Descrição da categoria 1 Operadora 2021 Fonte:";
        let result = TableExtractor::new(text).get_table(30);
        assert!(matches!(
            result,
            Err(ExtractError::ColumnMismatch { table: 30, codes: 2, descriptions: 1 })
        ));
    }

    #[test]
    fn test_year_tokens_are_dropped() {
        assert_eq!(drop_year_tokens(strings(&["1", "2021", "2"])), strings(&["1", "2"]));
    }

    #[test]
    fn test_page_numbers_continuing_the_sequence_are_kept() {
        let codes = strings(&["114", "115", "116", "117", "118", "119", "120"]);
        assert_eq!(drop_page_numbers(codes.clone(), &TABLE_31_PAGES), codes);
    }

    #[test]
    fn test_page_numbers_are_compared_to_last_kept_code() {
        // 116 after 114 is a page number; the following 117 is then compared to 114, not 116
        let codes = strings(&["114", "116", "117", "115"]);
        assert_eq!(drop_page_numbers(codes, &TABLE_31_PAGES), strings(&["114", "115"]));
    }

    #[test]
    fn test_leading_page_number_is_dropped() {
        let codes = strings(&["118", "1", "2"]);
        assert_eq!(drop_page_numbers(codes, &TABLE_31_PAGES), strings(&["1", "2"]));
    }

    #[test]
    fn test_kept_page_values_always_continue_sequence() {
        let codes = strings(&["3", "117", "4", "115", "116", "119", "117", "118"]);
        let kept = drop_page_numbers(codes, &TABLE_31_PAGES);

        for (i, code) in kept.iter().enumerate() {
            let value: u32 = code.parse().unwrap();
            if TABLE_31_PAGES.contains(&value) {
                let previous: u32 = kept[i - 1].parse().unwrap();
                assert_eq!(previous + 1, value);
            }
        }
        assert_eq!(kept, strings(&["3", "4", "115", "116", "117", "118"]));
    }

    #[test]
    fn test_footer_descriptions_are_dropped() {
        let descriptions = strings(&["Consulta", "", "Padrão TISS - Componente Organizacional novembro de", "Exame"]);
        assert_eq!(drop_footer_descriptions(descriptions), strings(&["Consulta", "Exame"]));
    }
}
