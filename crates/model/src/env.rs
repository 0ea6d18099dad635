/// Default environment variable containing the namespace handlers are invoked under
pub const LAMBDA_CLIENT_NAMESPACE: &'static str = "LAMBDA_CLIENT_NAMESPACE";
