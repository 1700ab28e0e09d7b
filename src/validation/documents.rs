//! Uploaded files and external links attached to employees, riders and horses.

use super::fields::{check_file_size, check_valid_extension, check_valid_format, is_valid_url};
use super::general::{check_select, Text};

const TITLE_SPECIALS: &[char] = &[
    '-', '_', '.', '(', ')', '[', ']', '{', '}', '!', '@', '#', '$', '%', '^', '&', '*', '=', '+', ',', ';', ':',
    '\'', '"', '<', '>', '?', '~', '`',
];

/// A file received in a multipart upload.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub filename: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// `types` is `None` for owners whose documents are not categorized.
pub fn check_upload(file: Option<&UploadedFile>, title: &str, doc_type: &str, types: Option<&[&str]>) -> Vec<String> {
    let mut m = Vec::new();
    match file {
        None => m.push("Debe seleccionar un archivo".to_string()),
        Some(f) if f.filename.is_empty() || f.bytes.is_empty() => {
            m.push("Debe seleccionar un archivo".to_string())
        }
        Some(f) => {
            if !check_file_size(f.bytes.len()) {
                m.push("El archivo supera el tamaño máximo permitido de 15 MB".to_string());
            }
            if !check_valid_format(&f.content_type) || !check_valid_extension(&f.filename) {
                m.push("El formato del archivo no está permitido".to_string());
            }
        }
    }
    if title.trim().is_empty() {
        m.push("Ingrese un título para el archivo".to_string());
    } else if title.chars().count() > 100 {
        m.push("El título tiene un límite de 100 caracteres".to_string());
    }
    if let Some(types) = types {
        if !types.contains(&doc_type) {
            m.push("Ingrese un tipo válido de documento".to_string());
        }
    }
    m
}

pub fn check_link(title: &str, url: &str, doc_type: &str, types: Option<&[&str]>) -> Vec<String> {
    if title.trim().is_empty() {
        return vec!["Ingrese un título para el enlace".to_string()];
    }
    let mut m = Vec::new();
    if title.chars().count() > 30 {
        m.push("El título tiene un límite de 30 caracteres".to_string());
    }
    if url.trim().is_empty() {
        m.push("Ingrese un enlace".to_string());
        return m;
    }
    if let Some(types) = types {
        if !types.contains(&doc_type) {
            m.push("Ingrese un tipo válido de documento".to_string());
        }
    }
    if !is_valid_url(url.trim()) {
        m.push("Por favor ingrese un enlace a un archivo real".to_string());
    }
    m
}

/// Edit of title and type; `url` is only checked for link documents.
pub fn check_modify(title: &str, doc_type: &str, url: Option<&str>, types: Option<&[&str]>) -> Vec<String> {
    let mut m = Text::new("Título", 100)
        .numbers()
        .specials(TITLE_SPECIALS)
        .spaced()
        .digits_only_ok()
        .check(title);
    if let Some(types) = types {
        m.extend(check_select(doc_type, "Tipo de documento", types));
    }
    if let Some(url) = url {
        if !is_valid_url(url.trim()) {
            m.push("Por favor ingrese un enlace a un archivo real".to_string());
        }
    }
    m
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{HORSE_DOCUMENT_TYPES, RIDER_DOCUMENT_TYPES};

    fn pdf(len: usize) -> UploadedFile {
        UploadedFile {
            filename: "informe.pdf".into(),
            content_type: "application/pdf".into(),
            bytes: vec![0; len],
        }
    }

    #[test]
    fn upload_rules() {
        assert!(check_upload(Some(&pdf(10)), "Informe", "evaluacion", Some(RIDER_DOCUMENT_TYPES)).is_empty());
        assert_eq!(
            check_upload(None, "", "x", Some(RIDER_DOCUMENT_TYPES)),
            vec![
                "Debe seleccionar un archivo",
                "Ingrese un título para el archivo",
                "Ingrese un tipo válido de documento"
            ]
        );
        let mut txt = pdf(10);
        txt.content_type = "text/plain".into();
        assert_eq!(check_upload(Some(&txt), "Notas", "", None).len(), 1);
    }

    #[test]
    fn link_rules() {
        assert!(check_link("Video", "https://youtu.be/abc", "planificacion", Some(HORSE_DOCUMENT_TYPES)).is_empty());
        assert_eq!(
            check_link("", "https://youtu.be/abc", "x", Some(HORSE_DOCUMENT_TYPES)),
            vec!["Ingrese un título para el enlace"]
        );
        assert_eq!(
            check_link("Video", "no es un link", "planificacion", Some(HORSE_DOCUMENT_TYPES)),
            vec!["Por favor ingrese un enlace a un archivo real"]
        );
    }

    #[test]
    fn modify_rules() {
        assert!(check_modify("Plan [2024] v2", "planificaciones", None, Some(RIDER_DOCUMENT_TYPES)).is_empty());
        assert_eq!(
            check_modify("Plan", "otro", Some("https://drive.google.com/x"), Some(RIDER_DOCUMENT_TYPES)).len(),
            1
        );
    }
}
