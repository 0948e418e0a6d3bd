//! The member resolution pipeline.
//!
//! For every member of a [`Fillable`] type, in declaration order:
//!
//! 1. The schema is expanded into [`MemberDescriptor`]s. Malformed schemas fail
//!    here, before any provider is called.
//! 2. The member's provider is resolved: its own name, else the class-level
//!    name, else the filler default.
//! 3. The raw value is fetched. `None` (or a [`Value::Null`]) means not found.
//! 4. A found value is converted from its runtime type to the member's target
//!    type through the [`ConverterChooser`] and written into the member.
//! 5. A required member that is missing or fails to convert aborts the fill.
//!    An optional one is reset to its natural default instead.
//!
//! Members already written when a fill aborts keep their new values; there is
//! no rollback.
//!
//! [`SettingsFiller::fill_settings`] drives async providers to completion on
//! the calling thread (see [`bridge`](crate::bridge)).
//! [`SettingsFiller::fill_settings_async`] awaits them and calls sync
//! providers inline. Both follow the same rules.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::chooser::{ConverterChooser, Dispatch};
use crate::error::FillfigError;
use crate::providers::{Provider, Providers};
use crate::schema::{Fillable, MemberDescriptor, Slot};
use crate::value::Value;

/// Fills settings objects from named providers.
///
/// Configure once, then share: every method takes `&self`, and the chooser
/// and providers are never mutated by a fill.
#[derive(Clone)]
pub struct SettingsFiller {
    chooser: Arc<ConverterChooser>,
    providers: Providers,
}

impl SettingsFiller {
    pub fn builder() -> SettingsFillerBuilder {
        SettingsFillerBuilder::new()
    }

    pub fn new(chooser: Arc<ConverterChooser>, providers: Providers) -> Result<Self, FillfigError> {
        providers.validate()?;
        Ok(Self { chooser, providers })
    }

    pub fn chooser(&self) -> &ConverterChooser {
        &self.chooser
    }

    pub fn providers(&self) -> &Providers {
        &self.providers
    }

    /// Fill every member of `target` in place.
    pub fn fill_settings<T: Fillable>(&self, target: &mut T) -> Result<(), FillfigError> {
        let schema = T::schema();
        for (member, slot) in schema.plan()? {
            let (provider_name, provider) = self.providers.resolve(member.provider())?;
            debug!(
                member = member.member(),
                key = member.key(),
                provider = provider_name,
                "resolving setting"
            );
            let raw = provider.fetch_blocking(member.key())?;
            self.settle(target, &member, slot, raw)?;
        }
        Ok(())
    }

    /// Async counterpart of [`fill_settings`](Self::fill_settings).
    pub async fn fill_settings_async<T: Fillable + Send>(
        &self,
        target: &mut T,
    ) -> Result<(), FillfigError> {
        let schema = T::schema();
        for (member, slot) in schema.plan()? {
            let (provider_name, provider) = self.providers.resolve(member.provider())?;
            debug!(
                member = member.member(),
                key = member.key(),
                provider = provider_name,
                "resolving setting"
            );
            let raw = provider.fetch(member.key()).await?;
            self.settle(target, &member, slot, raw)?;
        }
        Ok(())
    }

    /// Build `T::default()` and fill it.
    pub fn create_with_settings<T: Fillable + Default>(&self) -> Result<T, FillfigError> {
        let mut settings = T::default();
        self.fill_settings(&mut settings)?;
        Ok(settings)
    }

    /// Async counterpart of [`create_with_settings`](Self::create_with_settings).
    pub async fn create_with_settings_async<T: Fillable + Default + Send>(
        &self,
    ) -> Result<T, FillfigError> {
        let mut settings = T::default();
        self.fill_settings_async(&mut settings).await?;
        Ok(settings)
    }

    /// Convert and assign one fetched raw value, applying the required/default
    /// policy.
    fn settle<T>(
        &self,
        target: &mut T,
        member: &MemberDescriptor,
        slot: &dyn Slot<T>,
        raw: Option<Value>,
    ) -> Result<(), FillfigError> {
        let Some(raw) = raw.filter(|v| !v.is_null()) else {
            if member.is_required() {
                return Err(FillfigError::RequiredSettingMissing {
                    member: member.member().to_string(),
                    key: member.key().to_string(),
                });
            }
            debug!(
                member = member.member(),
                key = member.key(),
                "setting not found, using default"
            );
            slot.assign_default(target, member.metadata(false));
            return Ok(());
        };

        let outcome = self
            .chooser
            .choose_and_convert(&raw, &raw.type_tag(), member.target_type())
            .and_then(|value| slot.assign(target, value, member.metadata(true)));

        match outcome {
            Ok(()) => Ok(()),
            Err(source) if member.is_required() => {
                Err(FillfigError::RequiredSettingConversionFailed {
                    member: member.member().to_string(),
                    key: member.key().to_string(),
                    source: Box::new(source),
                })
            }
            Err(error) => {
                warn!(
                    member = member.member(),
                    key = member.key(),
                    %error,
                    "optional setting failed to convert, using default"
                );
                slot.assign_default(target, member.metadata(false));
                Ok(())
            }
        }
    }
}

/// Builder for [`SettingsFiller`].
///
/// ```
/// use fillfig::{EnvProvider, MapProvider, Provider, SettingsFiller};
///
/// let filler = SettingsFiller::builder()
///     .provider("defaults", Provider::from_sync(MapProvider::new().with("Port", "8080")))
///     .provider("env", Provider::from_sync(EnvProvider::new()))
///     .default_provider("defaults")
///     .build()
///     .unwrap();
/// assert_eq!(filler.providers().len(), 2);
/// ```
pub struct SettingsFillerBuilder {
    chooser: Option<Arc<ConverterChooser>>,
    providers: Providers,
}

impl SettingsFillerBuilder {
    fn new() -> Self {
        Self {
            chooser: None,
            providers: Providers::new(),
        }
    }

    /// Use `chooser` instead of [`ConverterChooser::standard`].
    pub fn converters(mut self, chooser: ConverterChooser) -> Self {
        self.chooser = Some(Arc::new(chooser));
        self
    }

    /// Share an existing chooser with other fillers.
    pub fn shared_converters(mut self, chooser: Arc<ConverterChooser>) -> Self {
        self.chooser = Some(chooser);
        self
    }

    /// Register a provider. The first one registered is the default unless
    /// [`default_provider`](Self::default_provider) names another.
    pub fn provider(mut self, name: impl Into<String>, provider: Provider) -> Self {
        self.providers.insert(name, provider);
        self
    }

    pub fn default_provider(mut self, name: impl Into<String>) -> Self {
        self.providers = self.providers.default_provider(name);
        self
    }

    pub fn build(self) -> Result<SettingsFiller, FillfigError> {
        let chooser = match self.chooser {
            Some(chooser) => chooser,
            None => Arc::new(ConverterChooser::standard()?),
        };
        SettingsFiller::new(chooser, self.providers)
    }
}
