use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use bytes::Bytes;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use xds_core::mtom::MtomCodec;
use xds_core::{
    Document, MetadataSummary, OutboundRequest, RegistryConfig, RegistryResponseParser,
};

#[derive(Parser)]
#[command(name = "xds")]
#[command(about = "XDS.b provide-and-register test harness CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build an MTOM-encoded ITI-41 request for one document
    Package {
        /// Registry configuration (YAML)
        #[arg(long)]
        config: PathBuf,
        /// Document to submit
        #[arg(long)]
        document: PathBuf,
        /// Patient identifier within the assigning authority
        #[arg(long)]
        patient_id: String,
        /// Assigning authority OID
        #[arg(long)]
        patient_oid: String,
        /// Pre-signed security header inserted into the SOAP header
        #[arg(long)]
        security_header: Option<PathBuf>,
        /// Where to write the request body
        #[arg(long)]
        out: PathBuf,
    },
    /// Decode an MTOM body and list its parts
    Decode {
        /// Content-Type header value the body was sent with
        #[arg(long)]
        content_type: String,
        /// Request or response body
        #[arg(long)]
        body: PathBuf,
    },
    /// Parse a registry response
    ParseResponse {
        /// Response body, plain XML or MTOM
        #[arg(long)]
        file: PathBuf,
        /// Content-Type header value, needed for MTOM responses
        #[arg(long)]
        content_type: Option<String>,
    },
}

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env().add_directive("xds=info".parse()?))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Package {
            config,
            document,
            patient_id,
            patient_oid,
            security_header,
            out,
        } => {
            let content_type = package(
                &config,
                &document,
                &patient_id,
                &patient_oid,
                security_header.as_deref(),
                &out,
            )?;
            println!("{content_type}");
            Ok(())
        }
        Commands::Decode { content_type, body } => decode(&content_type, &body),
        Commands::ParseResponse { file, content_type } => {
            parse_response(&file, content_type.as_deref())
        }
    }
}

fn package(
    config: &Path,
    document: &Path,
    patient_id: &str,
    patient_oid: &str,
    security_header: Option<&Path>,
    out: &Path,
) -> anyhow::Result<String> {
    let config = RegistryConfig::from_yaml_file(config)
        .with_context(|| format!("loading {}", config.display()))?;
    let content = std::fs::read(document)
        .with_context(|| format!("reading {}", document.display()))?;
    let document_id = document
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "document".into());
    let header = security_header
        .map(|path| {
            std::fs::read(path).with_context(|| format!("reading {}", path.display()))
        })
        .transpose()?;

    let request = OutboundRequest::build(
        Arc::new(config),
        patient_id,
        patient_oid,
        Document::new(document_id, patient_id, content),
        header.as_deref(),
        &MtomCodec::new(),
    )?;

    let mut file = std::fs::File::create(out)
        .with_context(|| format!("creating {}", out.display()))?;
    request.body.write_to(&mut file)?;

    tracing::info!(
        message_id = %request.message_id,
        submission_set_id = %request.submission_set_id,
        document_entry_id = %request.document_entry_id,
        out = %out.display(),
        "wrote ITI-41 request body"
    );
    Ok(request.content_type().to_owned())
}

fn decode(content_type: &str, body: &Path) -> anyhow::Result<()> {
    let bytes = Bytes::from(
        std::fs::read(body).with_context(|| format!("reading {}", body.display()))?,
    );
    let package = MtomCodec::new().decode_envelope(&bytes, content_type)?;
    tracing::info!(
        root = %package.root_content_id,
        attachments = package.attachments.len(),
        bytes = package.attachment_bytes(),
        "decoded MTOM package"
    );

    println!("{}", package.control_xml);
    println!();
    for attachment in &package.attachments {
        println!(
            "cid:{}  {}  {} bytes",
            attachment.content_id,
            attachment.content_type,
            attachment.len()
        );
    }

    match MetadataSummary::from_xml(&package.control_xml) {
        Ok(summary) => {
            if let Some(id) = &summary.submission_set_id {
                println!("SubmissionSet: {id}");
            }
            for id in &summary.document_ids {
                println!("DocumentEntry: {id}");
            }
            for reference in &summary.document_references {
                let status = if package.attachment(reference).is_some() {
                    "resolved"
                } else {
                    "MISSING"
                };
                println!("Document -> cid:{reference} ({status})");
            }
        }
        Err(e) => tracing::warn!(error = %e, "control part is not well-formed XML"),
    }

    if let Err(e) = package.resolve_references() {
        tracing::warn!(error = %e, "unresolved xop:Include reference");
    }
    Ok(())
}

fn parse_response(file: &Path, content_type: Option<&str>) -> anyhow::Result<()> {
    let bytes = Bytes::from(
        std::fs::read(file).with_context(|| format!("reading {}", file.display()))?,
    );
    let response = RegistryResponseParser::new().parse_bytes(&bytes, content_type)?;
    if !response.is_success() {
        tracing::warn!(status = response.status.as_urn(), "registry did not accept the submission");
    }

    println!("Status: {}", response.status.as_urn());
    if let Some(id) = &response.submission_set_id {
        println!("SubmissionSet: {id}");
    }
    for id in &response.document_ids {
        println!("DocumentEntry: {id}");
    }
    if let Some(id) = &response.request_correlation_id {
        println!("RelatesTo: {id}");
    }
    for issue in response.errors.iter().chain(&response.warnings) {
        println!("{:?} {}: {}", issue.severity, issue.code, issue.context);
    }
    Ok(())
}
