/// Expands resources × sources into `arn:aws:<service>:::<resource>/<source>`,
/// resource-major.
pub fn resolve<R, S>(service: &str, resource_names: &[R], source_systems: &[S]) -> Vec<String>
where
    R: AsRef<str>,
    S: AsRef<str>,
{
    let service = service.to_lowercase();
    let mut arns = Vec::with_capacity(resource_names.len() * source_systems.len());

    for name in resource_names {
        for source in source_systems {
            arns.push(format!(
                "arn:aws:{}:::{}/{}",
                service,
                name.as_ref(),
                source.as_ref()
            ));
        }
    }

    arns
}
