use std::path::PathBuf;

use anyhow::{anyhow, bail, Result};
use async_trait::async_trait;
use basecamp_client::{
    resources,
    Entity,
    EntityId,
    FormBody,
    ResourceSpec,
    Response,
};
use clap::Parser;
use clap_stdin::FileOrStdin;
use serde_json::Value;
use tokio::io::AsyncWriteExt;

use crate::args::CommonOptions;
use crate::{confirm_or_abort, emitln, RunResourceCommand};

/// The definition and files of a create/update submission.
#[derive(Clone, Debug, Parser)]
pub struct FormArgs {
    /// JSON file with the entity's fields, or use - for stdin
    file: FileOrStdin<String>,
    /// Attach a file to a form field (images, PDFs). Repeatable.
    #[clap(long = "attach", value_name = "FIELD=PATH")]
    attachments: Vec<String>,
}

impl FormArgs {
    fn body(&self) -> Result<FormBody> {
        let json: Value = serde_json::from_str(&self.file)
            .map_err(|e| anyhow!("Failed to parse JSON: {e}"))?;
        let Value::Object(fields) = json else {
            bail!("The definition must be a JSON object");
        };
        let mut body = FormBody::new(fields);
        for raw in &self.attachments {
            let (field, path) = parse_attachment(raw)?;
            body = body.attach(field, path);
        }
        Ok(body)
    }
}

fn parse_attachment(raw: &str) -> Result<(String, PathBuf)> {
    match raw.split_once('=') {
        | Some((field, path))
            if !field.trim().is_empty() && !path.trim().is_empty() =>
        {
            Ok((field.trim().to_owned(), PathBuf::from(path.trim())))
        }
        | _ => bail!("attachments are written as field=path, got '{raw}'"),
    }
}

async fn preview<A: tokio::io::AsyncWrite + Send + Sync + Unpin>(
    out: &mut tokio::io::BufWriter<A>,
    body: &FormBody,
) -> Result<()> {
    let colored =
        colored_json::to_colored_json_auto(&Value::Object(body.fields.clone()))?;
    emitln!(out, "----");
    emitln!(out, "{colored}");
    for attachment in &body.attachments {
        emitln!(
            out,
            "{}: {}",
            attachment.field,
            attachment.path.display()
        );
    }
    emitln!(out, "----");
    out.flush().await?;
    Ok(())
}

async fn report<A: tokio::io::AsyncWrite + Send + Sync + Unpin>(
    out: &mut tokio::io::BufWriter<A>,
    spec: &ResourceSpec,
    response: Response<Option<Entity>>,
    verb: &str,
) -> Result<()> {
    let message = response.message().map(str::to_owned);
    match response.into_inner()? {
        | Some(entity) => {
            let json = serde_json::to_value(&entity)?;
            emitln!(out, "{}", colored_json::to_colored_json_auto(&json)?);
            emitln!(out);
            emitln!(out, "{} '{}' was {verb} successfully", spec.kind, entity.id);
        }
        | None => {
            emitln!(
                out,
                "{}",
                message.unwrap_or_else(|| format!("{} was {verb}", spec.kind))
            );
        }
    }
    Ok(())
}

#[derive(Clone, Debug, Parser)]
pub struct Create {
    #[clap(flatten)]
    form: FormArgs,
}

#[async_trait]
impl RunResourceCommand for Create {
    async fn run<
        A: tokio::io::AsyncWrite + Send + Sync + Unpin,
        B: tokio::io::AsyncWrite + Send + Sync + Unpin,
    >(
        &self,
        spec: &'static ResourceSpec,
        out: &mut tokio::io::BufWriter<A>,
        _err: &mut tokio::io::BufWriter<B>,
        common_options: &CommonOptions,
    ) -> Result<()> {
        let body = self.form.body()?;
        emitln!(out, "You are about to create this {}:", spec.kind);
        preview(out, &body).await?;
        confirm_or_abort!(
            common_options,
            "Are you sure you want to create this {}?",
            spec.kind
        );

        let client = common_options.new_client().await?;
        let response = resources::create(&client, spec, body).await?;
        report(out, spec, response, "created").await
    }
}

#[derive(Clone, Debug, Parser)]
pub struct Update {
    /// Entity id
    id: EntityId,
    #[clap(flatten)]
    form: FormArgs,
}

#[async_trait]
impl RunResourceCommand for Update {
    async fn run<
        A: tokio::io::AsyncWrite + Send + Sync + Unpin,
        B: tokio::io::AsyncWrite + Send + Sync + Unpin,
    >(
        &self,
        spec: &'static ResourceSpec,
        out: &mut tokio::io::BufWriter<A>,
        _err: &mut tokio::io::BufWriter<B>,
        common_options: &CommonOptions,
    ) -> Result<()> {
        let body = self.form.body()?;
        emitln!(
            out,
            "You are about to replace {} '{}' with:",
            spec.kind,
            self.id
        );
        preview(out, &body).await?;
        confirm_or_abort!(
            common_options,
            "Are you sure you want to update {} '{}'?",
            spec.kind,
            self.id
        );

        let client = common_options.new_client().await?;
        let response = resources::update(&client, spec, &self.id, body).await?;
        report(out, spec, response, "updated").await
    }
}
