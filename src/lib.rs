pub mod config;
pub mod context;
pub mod error;
pub mod hooks;
pub mod preservation;
pub mod purge;
pub mod resolver;
pub mod site;
pub mod store;
pub mod transform;
pub mod utils;

pub use config::EngineConfig;
pub use context::{RequestClass, RequestContext, RequestSignals};
pub use error::{BackendError, SettingsError, SettingsResult};
pub use hooks::{EntryPoint, HookBinding, HookPlan};
pub use preservation::{PreserveData, TeardownOutcome, should_preserve};
pub use purge::{CachePurger, FnPurger, PurgeCoordinator, PurgeReport};
pub use resolver::{
    EffectiveDomainSetting, EffectiveRelativeUrlPolicy, ResolvedSettings, SettingSource,
    SettingsResolver,
};
pub use site::Site;
pub use store::{
    ContentType, ContentTypeSelection, JsonFileBackend, MemoryBackend, NetworkDomainSettings,
    OptionBackend, OptionScope, RelativeUrlSettings, SettingsStore,
};
pub use transform::{PermalinkTransformer, SitemapEntry, make_relative, transform_structured};
