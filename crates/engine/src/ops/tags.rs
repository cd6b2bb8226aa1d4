use sea_orm::{ActiveValue, QueryOrder, prelude::*};

use crate::{
    EngineError, ResultEngine, Tag, TagCmd, ValidationErrors, tags,
    util::{self, TAG_NAME_MAX_LEN},
};

use super::{Engine, access::owned_by};

impl Engine {
    /// Lists the tags owned by `user_id`.
    pub async fn list_tags(&self, user_id: i32) -> ResultEngine<Vec<Tag>> {
        let tags = owned_by::<tags::Entity>(user_id)
            .order_by_asc(tags::Column::Id)
            .all(&self.database)
            .await?;
        Ok(tags.into_iter().map(Tag::from).collect())
    }

    /// Adds a tag owned by `user_id`.
    pub async fn create_tag(&self, user_id: i32, cmd: TagCmd) -> ResultEngine<Tag> {
        let mut errors = ValidationErrors::new();
        let name = util::required_text(&mut errors, "name", cmd.name.as_deref(), TAG_NAME_MAX_LEN);
        errors.into_result()?;
        let Some(name) = name else {
            return Err(EngineError::Validation(ValidationErrors::single(
                "name",
                util::REQUIRED,
            )));
        };

        let model = tags::ActiveModel {
            user_id: ActiveValue::Set(Some(user_id)),
            name: ActiveValue::Set(name),
            ..Default::default()
        }
        .insert(&self.database)
        .await?;

        tracing::debug!(user_id, tag_id = model.id, "tag created");
        Ok(model.into())
    }
}
