//! crates/yaydoc_core/src/arguments.rs
//!
//! Maps a generation request onto the generator's command-line contract:
//! `-g <git url> -a <author> -t <theme> -p <doc path> -o <project name>
//!  -v <version> -m <email> -u <job id>`.

use crate::domain::{ArgumentList, GenerationRequest, JobId};

pub const FLAG_GIT_URL: &str = "-g";
pub const FLAG_AUTHOR: &str = "-a";
pub const FLAG_THEME: &str = "-t";
pub const FLAG_DOC_PATH: &str = "-p";
pub const FLAG_PROJECT_NAME: &str = "-o";
pub const FLAG_VERSION: &str = "-v";
pub const FLAG_EMAIL: &str = "-m";
pub const FLAG_JOB_ID: &str = "-u";

/// Builds the argument vector for one job.
///
/// Values are passed as discrete arguments, never joined into a shell string,
/// so spaces and quotes cannot shift argument boundaries.
pub fn build_arguments(request: &GenerationRequest, id: &JobId) -> ArgumentList {
    let pairs = [
        (FLAG_GIT_URL, request.git_url.clone()),
        (FLAG_AUTHOR, request.author.clone()),
        (FLAG_THEME, request.doc_theme.clone()),
        (FLAG_DOC_PATH, request.doc_path.clone()),
        (FLAG_PROJECT_NAME, request.project_name.clone()),
        (FLAG_VERSION, request.version.clone()),
        (FLAG_EMAIL, request.email.clone()),
        (FLAG_JOB_ID, id.to_string()),
    ];

    let mut args = Vec::with_capacity(pairs.len() * 2);
    for (flag, value) in pairs {
        args.push(flag.to_string());
        args.push(value);
    }
    ArgumentList::new(args)
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn job_id() -> JobId {
        JobId::from_uuid(Uuid::parse_str("6f1c1d0e-8a4b-4c5d-9e2f-0123456789ab").unwrap())
    }

    #[test]
    fn reproduces_the_generator_contract() {
        let request = GenerationRequest {
            email: "a@x.com".to_string(),
            author: "A".to_string(),
            git_url: "https://example.com/r.git".to_string(),
            doc_theme: "t".to_string(),
            doc_path: "/".to_string(),
            project_name: "p".to_string(),
            version: "1.0".to_string(),
        };

        let args = build_arguments(&request, &job_id());

        assert_eq!(
            args.as_slice(),
            [
                "-g",
                "https://example.com/r.git",
                "-a",
                "A",
                "-t",
                "t",
                "-p",
                "/",
                "-o",
                "p",
                "-v",
                "1.0",
                "-m",
                "a@x.com",
                "-u",
                "6f1c1d0e-8a4b-4c5d-9e2f-0123456789ab",
            ]
        );
    }

    #[test]
    fn special_characters_stay_within_their_argument() {
        let request = GenerationRequest {
            email: "a b@x.com".to_string(),
            author: "Jane \"JD\" Doe; rm -rf /".to_string(),
            git_url: "https://example.com/r.git?x=1&y=2".to_string(),
            doc_theme: "sphinx rtd".to_string(),
            doc_path: "docs/my folder".to_string(),
            project_name: "$(echo p) `q`".to_string(),
            version: "1.0 beta".to_string(),
        };

        let args = build_arguments(&request, &job_id());

        assert_eq!(args.len(), 16);
        let flags: Vec<&str> = args.iter().step_by(2).collect();
        assert_eq!(flags, ["-g", "-a", "-t", "-p", "-o", "-v", "-m", "-u"]);
        let values: Vec<&str> = args.iter().skip(1).step_by(2).collect();
        assert_eq!(
            values,
            [
                request.git_url.as_str(),
                request.author.as_str(),
                request.doc_theme.as_str(),
                request.doc_path.as_str(),
                request.project_name.as_str(),
                request.version.as_str(),
                request.email.as_str(),
                "6f1c1d0e-8a4b-4c5d-9e2f-0123456789ab",
            ]
        );
    }
}
