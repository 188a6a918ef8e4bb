// src/document/models.rs
use crate::utils::error::ExtractError;
use std::fmt;

/// Full plain text of the source document, extracted once and shared read-only
#[derive(Debug, Clone)]
pub struct DocumentText(String);

impl DocumentText {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

/// The printed tables ("Quadros") this tool knows how to extract
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TableId {
    Demandante = 30,
    CategoriaTiss = 31,
    TipoSolicitacao = 32,
}

impl TableId {
    /// All supported tables in processing order
    pub const ALL: [TableId; 3] = [TableId::Demandante, TableId::CategoriaTiss, TableId::TipoSolicitacao];

    pub fn number(self) -> u32 {
        self as u32
    }

    /// Caption that precedes the table in the document text (note the en-dash)
    pub fn start_marker(self) -> &'static str {
        match self {
            TableId::Demandante => "Quadro 30 – Tabela de tipo de demandante",
            TableId::CategoriaTiss => "Quadro 31 – Tabela de categoria do Padrão TISS",
            TableId::TipoSolicitacao => "Quadro 32 – Tabela de tipo de solicitação",
        }
    }

    /// Human-readable title, also used to name the output files
    pub fn title(self) -> &'static str {
        match self {
            TableId::Demandante => "Tabela de tipo de demandante",
            TableId::CategoriaTiss => "Tabela de Categoria do Padrão TISS",
            TableId::TipoSolicitacao => "Tabela de Tipo de Solicitação",
        }
    }

    pub fn file_name(self) -> String {
        format!("{}.csv", self.title())
    }
}

impl TryFrom<u32> for TableId {
    type Error = ExtractError;

    fn try_from(number: u32) -> Result<Self, Self::Error> {
        match number {
            30 => Ok(TableId::Demandante),
            31 => Ok(TableId::CategoriaTiss),
            32 => Ok(TableId::TipoSolicitacao),
            other => Err(ExtractError::UnsupportedTable(other)),
        }
    }
}

impl fmt::Display for TableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Quadro {}", self.number())
    }
}

/// One extracted table: two parallel columns paired by position
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    pub id: TableId,
    pub codes: Vec<String>,
    pub descriptions: Vec<String>,
}

impl Table {
    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    /// Iterates the rows as `(code, description)` pairs
    pub fn rows(&self) -> impl Iterator<Item = (&str, &str)> {
        self.codes
            .iter()
            .map(String::as_str)
            .zip(self.descriptions.iter().map(String::as_str))
    }
}
