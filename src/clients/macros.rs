/// Generates methods shared by every resource client: a raw `find_<entity>`
/// lookup (absent is `Ok(None)`) and a shutdown for the backing actor.
#[macro_export]
macro_rules! impl_client_methods {
    ($client_name:ident, $entity:ty, $error:ty, $entity_name_snake:ident) => {
        paste::paste! {
            impl $client_name {
                #[tracing::instrument(skip(self))]
                pub async fn [<find_ $entity_name_snake>](&self, id: String) -> Result<Option<$entity>, $error> {
                    tracing::debug!("Sending request");
                    self.inner.get(id).await
                }

                /// Stops the backing actor.
                pub async fn [<shutdown_ $entity_name_snake _actor>](&self) -> Result<(), $error> {
                    self.inner.shutdown().await
                }
            }
        }
    };
}
