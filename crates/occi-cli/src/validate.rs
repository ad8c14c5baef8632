//! cross-field validation
//!
//! Runs in two phases:
//! 1. flag combinations that are never valid (`--filter` needs `--dump-model`, `--voms` needs x509)
//! 2. fields demanded by the selected action, skipped when dumping the model
//!
//! Phase 2 reports every missing field at once.
use crate::descriptor::{Action, AuthMethod, RequestDescriptor};
use crate::error::{Field, ValidationError};

pub fn validate(descriptor: &RequestDescriptor) -> Result<(), ValidationError> {
    if descriptor.filter.is_some() && !descriptor.dump_model {
        return Err(ValidationError::FilterWithoutDumpModel);
    }

    if descriptor.auth.voms && descriptor.auth.method != AuthMethod::X509 {
        return Err(ValidationError::VomsWithoutX509);
    }

    if descriptor.dump_model {
        return Ok(());
    }

    let missing: Vec<Field> = mandatory_fields(descriptor)
        .into_iter()
        .filter(|field| !is_present(descriptor, *field))
        .collect();

    if !missing.is_empty() {
        tracing::debug!(?missing, "mandatory fields missing");
        return Err(ValidationError::MissingFields(missing));
    }

    Ok(())
}

fn mandatory_fields(descriptor: &RequestDescriptor) -> Vec<Field> {
    let mut mandatory = vec![Field::Resource, Field::Action];

    match descriptor.action {
        Some(Action::Trigger) => mandatory.push(Field::TriggerAction),
        Some(Action::Create) => {
            if descriptor.links.is_empty() {
                mandatory.push(Field::Mixins);
            } else {
                mandatory.push(Field::Links);
            }
            mandatory.push(Field::Attributes);

            // title is only looked for once there are attributes at all
            if !descriptor.attributes.is_empty() {
                mandatory.push(Field::Title);
            }
        }
        _ => {}
    }

    mandatory
}

fn is_present(descriptor: &RequestDescriptor, field: Field) -> bool {
    match field {
        Field::Resource => descriptor.resource.is_some(),
        Field::Action => descriptor.action.is_some(),
        Field::TriggerAction => descriptor.trigger_action.is_some(),
        Field::Links => !descriptor.links.is_empty(),
        Field::Mixins => !descriptor.mixins.is_empty(),
        Field::Attributes => !descriptor.attributes.is_empty(),
        Field::Title => descriptor.attributes.contains_key("title"),
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::descriptor::{DescriptorBuilder, Environment};
    use crate::mixin::Mixin;
    use pretty_assertions::assert_eq;

    fn builder() -> DescriptorBuilder {
        DescriptorBuilder::new(&Environment::default())
    }

    fn missing(builder: &DescriptorBuilder) -> Vec<Field> {
        match validate(builder.descriptor()) {
            Err(ValidationError::MissingFields(fields)) => fields,
            other => panic!("expected missing fields, got {other:?}"),
        }
    }

    #[test]
    fn empty_descriptor_misses_resource_and_action() {
        assert_eq!(missing(&builder()), vec![Field::Resource, Field::Action]);
    }

    #[test]
    fn list_needs_nothing_else() {
        let mut builder = builder();
        builder.resource("compute").action(Action::List);
        assert_eq!(validate(builder.descriptor()), Ok(()));
    }

    #[test]
    fn trigger_needs_trigger_action() {
        let mut builder = builder();
        builder.resource("/compute/1").action(Action::Trigger);
        assert_eq!(missing(&builder), vec![Field::TriggerAction]);

        builder.trigger_action("http://schemas.ogf.org/occi/infrastructure/compute/action#start");
        assert_eq!(validate(builder.descriptor()), Ok(()));
    }

    #[test]
    fn create_reports_whole_batch() {
        let mut builder = builder();
        builder.action(Action::Create);
        assert_eq!(
            missing(&builder),
            vec![Field::Resource, Field::Mixins, Field::Attributes]
        );
    }

    #[test]
    fn create_needs_title() {
        let mut builder = builder();
        builder
            .resource("compute")
            .action(Action::Create)
            .add_mixin(Mixin::new("http://localhost/os_tpl#", "debian6"))
            .insert_attribute("occi.core.summary", "no title");
        assert_eq!(missing(&builder), vec![Field::Title]);

        builder.insert_attribute("title", "MyVM");
        assert_eq!(validate(builder.descriptor()), Ok(()));
    }

    #[test]
    fn create_with_links_does_not_need_mixins() {
        let mut builder = builder();
        builder
            .resource("compute")
            .action(Action::Create)
            .add_link("/network/public")
            .insert_attribute("title", "MyVM");
        assert_eq!(validate(builder.descriptor()), Ok(()));
    }

    #[test]
    fn filter_needs_dump_model() {
        let mut builder = builder();
        builder.filter("compute").resource("compute").action(Action::List);
        assert_eq!(
            validate(builder.descriptor()),
            Err(ValidationError::FilterWithoutDumpModel)
        );

        builder.dump_model(true);
        assert_eq!(validate(builder.descriptor()), Ok(()));
    }

    #[test]
    fn dump_model_skips_mandatory_fields() {
        let mut builder = builder();
        builder.dump_model(true).action(Action::Create);
        assert_eq!(validate(builder.descriptor()), Ok(()));
    }

    #[test]
    fn voms_needs_x509() {
        let mut builder = builder();
        builder
            .resource("compute")
            .action(Action::List)
            .auth_method(AuthMethod::Basic)
            .voms(true);
        assert_eq!(
            validate(builder.descriptor()),
            Err(ValidationError::VomsWithoutX509)
        );

        builder.auth_method(AuthMethod::X509);
        assert_eq!(validate(builder.descriptor()), Ok(()));
    }

    #[test]
    fn voms_is_checked_before_mandatory_fields() {
        let mut builder = builder();
        builder.voms(true).dump_model(true);
        assert_eq!(
            validate(builder.descriptor()),
            Err(ValidationError::VomsWithoutX509)
        );
    }
}
