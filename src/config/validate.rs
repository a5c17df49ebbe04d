// src/config/validate.rs

use std::collections::HashSet;

use tracing::warn;
use url::Url;

use crate::config::model::{
    Credentials, InstanceConfig, RawInstanceConfig, RawSchedulerConfig, SchedulerConfig,
};
use crate::errors::{Result, SchedulerError};

impl TryFrom<RawSchedulerConfig> for SchedulerConfig {
    type Error = crate::errors::SchedulerError;

    fn try_from(raw: RawSchedulerConfig) -> std::result::Result<Self, Self::Error> {
        if raw.instances.is_empty() {
            warn!("config contains no instances; nothing will be scheduled");
        }

        let instances = raw
            .instances
            .iter()
            .enumerate()
            .map(|(index, instance)| validate_instance(index, instance))
            .collect::<Result<Vec<_>>>()?;

        ensure_unique_addresses(&instances)?;

        Ok(SchedulerConfig::new_unchecked(instances))
    }
}

fn validate_instance(index: usize, raw: &RawInstanceConfig) -> Result<InstanceConfig> {
    let mut url = Url::parse(raw.url.trim()).map_err(|e| {
        SchedulerError::ConfigError(format!("instances[{index}].url is not a valid URL: {e}"))
    })?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(SchedulerError::ConfigError(format!(
            "instances[{index}].url must use http or https (got '{}')",
            url.scheme()
        )));
    }

    let embedded = embedded_credentials(&url);
    strip_credentials(&mut url);

    let explicit = match (&raw.username, &raw.password) {
        (Some(username), Some(password)) => Some(Credentials {
            username: username.clone(),
            password: password.clone(),
        }),
        (None, None) => None,
        _ => {
            return Err(SchedulerError::ConfigError(format!(
                "instances[{index}]: username and password must be given together"
            )));
        }
    };

    Ok(InstanceConfig {
        url,
        credentials: explicit.or(embedded),
    })
}

fn embedded_credentials(url: &Url) -> Option<Credentials> {
    if url.username().is_empty() {
        return None;
    }
    Some(Credentials {
        username: url.username().to_string(),
        password: url.password().unwrap_or_default().to_string(),
    })
}

fn strip_credentials(url: &mut Url) {
    // Only fails for URLs that cannot carry credentials, which were rejected above.
    let _ = url.set_username("");
    let _ = url.set_password(None);
}

fn ensure_unique_addresses(instances: &[InstanceConfig]) -> Result<()> {
    let mut seen = HashSet::new();
    for instance in instances {
        let address = instance.address();
        if !seen.insert(address.clone()) {
            return Err(SchedulerError::ConfigError(format!(
                "instance '{address}' is configured more than once"
            )));
        }
    }
    Ok(())
}
