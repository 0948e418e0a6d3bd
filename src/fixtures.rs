#[cfg(test)]
pub mod test {
    use std::collections::HashMap;
    use std::time::Duration;

    use url::Url;

    use crate::providers::MapProvider;
    use crate::schema::{ClassToFill, Fillable, Schema, ToFill};
    use crate::setting::{Setting, SettingMetadata};

    #[derive(Debug, Default)]
    pub struct BasicSettings {
        pub port: u16,
        pub host: String,
        pub retries: u32,
        pub tmp: Setting<String>,
    }

    impl Fillable for BasicSettings {
        fn schema() -> Schema<Self> {
            Schema::new()
                .fill("port", ToFill::new().key("Port"), |s: &mut Self| &mut s.port)
                .fill("host", ToFill::new().key("Host"), |s| &mut s.host)
                .fill("retries", ToFill::new().key("Retries").optional(), |s| {
                    &mut s.retries
                })
                .fill_setting("tmp", ToFill::new().key("TMP").optional(), |s| &mut s.tmp)
        }
    }

    /// Provider holding every required key of [`BasicSettings`].
    pub fn full_basic_map() -> MapProvider {
        MapProvider::new()
            .with("Port", "1234")
            .with("Host", "localhost")
    }

    #[derive(Debug, Default)]
    pub struct ContainerSettings {
        pub ports: Vec<i32>,
        pub weights: HashMap<String, i32>,
        pub groups: Option<HashMap<String, Vec<Option<u16>>>>,
    }

    impl Fillable for ContainerSettings {
        fn schema() -> Schema<Self> {
            Schema::new()
                .fill("ports", ToFill::new().key("Ports"), |s: &mut Self| {
                    &mut s.ports
                })
                .fill("weights", ToFill::new().key("Weights"), |s| &mut s.weights)
                .fill("groups", ToFill::new().key("Groups").optional(), |s| {
                    &mut s.groups
                })
        }
    }

    /// Class-level defaults with one member overriding key and provider.
    #[derive(Debug, Default)]
    pub struct ClassLevelSettings {
        pub name: String,
        pub workers: u32,
        pub overridden: i32,
    }

    impl Fillable for ClassLevelSettings {
        fn schema() -> Schema<Self> {
            Schema::new()
                .class_to_fill(
                    ClassToFill::new()
                        .key_prefix("App:")
                        .all_required(false)
                        .provider("func"),
                )
                .field("name", |s: &mut Self| &mut s.name)
                .field("workers", |s| &mut s.workers)
                .fill(
                    "overridden",
                    ToFill::new().key("Override").provider("other"),
                    |s| &mut s.overridden,
                )
        }
    }

    /// A member type with no natural default.
    #[derive(Debug)]
    pub struct EndpointSettings {
        pub endpoint: Setting<Url>,
    }

    impl Default for EndpointSettings {
        fn default() -> Self {
            let url = Url::parse("http://localhost").expect("static url");
            Self {
                endpoint: Setting::new(url, SettingMetadata::default()),
            }
        }
    }

    impl Fillable for EndpointSettings {
        fn schema() -> Schema<Self> {
            Schema::new().fill_setting(
                "endpoint",
                ToFill::new().key("Endpoint").optional(),
                |s: &mut Self| &mut s.endpoint,
            )
        }
    }

    #[derive(Debug, Default)]
    pub struct TimeoutSettings {
        pub grace: Duration,
    }

    impl Fillable for TimeoutSettings {
        fn schema() -> Schema<Self> {
            Schema::new().fill("grace", ToFill::new().key("Grace").optional(), |s: &mut Self| {
                &mut s.grace
            })
        }
    }

    #[derive(Debug, Default)]
    pub struct ReadOnlySettings {
        pub value: i32,
    }

    impl Fillable for ReadOnlySettings {
        fn schema() -> Schema<Self> {
            Schema::new()
                .fill("value", ToFill::new(), |s: &mut Self| &mut s.value)
                .read_only::<String>("computed", ToFill::new())
        }
    }

    #[test]
    fn fixtures_describe_their_members() {
        let descriptors = BasicSettings::schema().descriptors().unwrap();
        assert_eq!(descriptors.len(), 4);
        let keys: Vec<&str> = descriptors.iter().map(|d| d.key()).collect();
        assert_eq!(keys, vec!["Port", "Host", "Retries", "TMP"]);
    }
}
