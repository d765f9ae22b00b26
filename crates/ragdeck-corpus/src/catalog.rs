//! Predefined benchmark corpora

use serde::Serialize;

/// A legal-domain benchmark corpus with its archive and query set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Corpus {
    pub key: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub corpus_url: &'static str,
    pub queries_url: &'static str,
}

impl Corpus {
    /// Prefix shared by every document path from this corpus
    pub fn path_prefix(&self) -> String {
        format!("{}_", self.key)
    }
}

pub static CORPORA: [Corpus; 4] = [
    Corpus {
        key: "maud",
        name: "MAUD",
        description: "MAUD: Merger Agreement Understanding Dataset",
        corpus_url: "https://www.dropbox.com/scl/fo/r7xfa5i3hdsbxex1w6amw/ALwI_ohLY7KCg7veDdHdAb8/corpus/maud?dl=0&rlkey=5n8zrbk4c08lbit3iiexofmwg&subfolder_nav_tracking=1&dl=1",
        queries_url: "https://www.dropbox.com/scl/fo/r7xfa5i3hdsbxex1w6amw/APO2GVe0eOLUG5Hm9Rdoa5Q/benchmarks/maud.json?rlkey=5n8zrbk4c08lbit3iiexofmwg&dl=1",
    },
    Corpus {
        key: "contractnli",
        name: "ContractNLI",
        description: "ContractNLI: Legal Contract Natural Language Inference Dataset",
        corpus_url: "https://www.dropbox.com/scl/fo/r7xfa5i3hdsbxex1w6amw/AA-MC5kfSSovBb6zOzlIEt8/corpus/contractnli?rlkey=5n8zrbk4c08lbit3iiexofmwg&subfolder_nav_tracking=1&st=fm5o1owj&dl=1",
        queries_url: "https://www.dropbox.com/scl/fo/r7xfa5i3hdsbxex1w6amw/APhiRxuoZvoq8sbUAJp_9IE/benchmarks/contractnli.json?rlkey=5n8zrbk4c08lbit3iiexofmwg&dl=1",
    },
    Corpus {
        key: "cuad",
        name: "CUAD",
        description: "CUAD: Contract Understanding Atticus Dataset",
        corpus_url: "https://www.dropbox.com/scl/fo/r7xfa5i3hdsbxex1w6amw/AL0guPQHmsmOjJerxZDEk_4/corpus/cuad?dl=0&rlkey=5n8zrbk4c08lbit3iiexofmwg&subfolder_nav_tracking=1&dl=1",
        queries_url: "https://www.dropbox.com/scl/fo/r7xfa5i3hdsbxex1w6amw/AOokCanBJ5IHk5TEMP699YE/benchmarks/cuad.json?rlkey=5n8zrbk4c08lbit3iiexofmwg&dl=1",
    },
    Corpus {
        key: "privacy_qa",
        name: "PrivacyQA",
        description: "PrivacyQA: Question Answering for Privacy Policies",
        corpus_url: "https://www.dropbox.com/scl/fo/r7xfa5i3hdsbxex1w6amw/AH_DYzwpq8JDseRV3ZJq6Eo/corpus/privacy_qa?dl=0&rlkey=5n8zrbk4c08lbit3iiexofmwg&subfolder_nav_tracking=1&dl=1",
        queries_url: "https://www.dropbox.com/scl/fo/r7xfa5i3hdsbxex1w6amw/ALHLEScOciSetNpW89rS79o/benchmarks/privacy_qa.json?rlkey=5n8zrbk4c08lbit3iiexofmwg&dl=1",
    },
];

/// Look up a corpus by key, case-insensitively
pub fn find(key: &str) -> Option<&'static Corpus> {
    CORPORA.iter().find(|c| c.key.eq_ignore_ascii_case(key.trim()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find() {
        assert_eq!(find("CUAD").map(|c| c.name), Some("CUAD"));
        assert_eq!(find(" privacy_qa ").map(|c| c.name), Some("PrivacyQA"));
        assert!(find("unknown").is_none());
    }

    #[test]
    fn test_prefix() {
        assert_eq!(find("maud").unwrap().path_prefix(), "maud_");
    }
}
