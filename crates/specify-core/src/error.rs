use thiserror::Error;

#[derive(Debug, Error)]
pub enum SpecifyError {
    #[error("not initialized: run 'specify init'")]
    NotInitialized,

    #[error("unknown agent '{0}'; supported agents: {1}")]
    UnknownAgent(String, String),

    #[error("unknown script type '{0}'; supported script types: sh, ps")]
    UnknownScriptType(String),

    #[error("{tool} not found; install {agent} from {url} or pass --ignore-agent-tools")]
    ToolMissing {
        tool: String,
        agent: String,
        url: String,
    },

    #[error("feature description is empty")]
    EmptyDescription,

    #[error("no feature number left after '{0}'; pass --number")]
    FeatureNumbersExhausted(String),

    #[error("not on a feature branch: '{0}' (feature branches are named like 001-feature-name)")]
    NotOnFeatureBranch(String),

    #[error("multiple spec directories share prefix '{prefix}': {matches}")]
    AmbiguousFeaturePrefix { prefix: String, matches: String },

    #[error("feature directory not found: {0} (run /specify first)")]
    FeatureDirMissing(String),

    #[error("{doc} not found in {dir} (run {hint} first)")]
    MissingDocument {
        doc: String,
        dir: String,
        hint: String,
    },

    #[error("no template asset matching '{pattern}' in release {tag}; available: {available}")]
    TemplateAssetNotFound {
        pattern: String,
        tag: String,
        available: String,
    },

    #[error("request to {url} failed with HTTP {status}{hint}")]
    HttpStatus {
        url: String,
        status: u16,
        hint: String,
    },

    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("archive error: {0}")]
    Archive(#[from] zip::result::ZipError),

    #[error("template archive is empty")]
    EmptyArchive,

    #[error("git {command} failed: {stderr}")]
    Git { command: String, stderr: String },

    #[error("home directory not found: set HOME environment variable")]
    HomeNotFound,

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, SpecifyError>;
