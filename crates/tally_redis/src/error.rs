// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use redis::{ErrorKind as RedisErrorKind, RedisError};
use tally_store::Error;

/// Maps a Redis failure onto the store error kinds.
///
/// Values that cannot be treated as the requested type are decode errors. That covers
/// `INCR` on text and any command run against a key holding another data type
/// (`WRONGTYPE`). Anything else means the server could not serve the request.
pub(crate) fn map_redis_error(err: RedisError) -> Error {
    if is_decode_failure(&err) {
        Error::decode(err)
    } else {
        Error::store_unavailable(err)
    }
}

fn is_decode_failure(err: &RedisError) -> bool {
    match err.kind() {
        RedisErrorKind::TypeError => true,
        // WRONGTYPE is not a code the client knows, so it arrives as an extension error.
        RedisErrorKind::ExtensionError => err.code() == Some("WRONGTYPE") || err.to_string().starts_with("WRONGTYPE"),
        RedisErrorKind::ResponseError => {
            let message = err.to_string();
            message.contains("not an integer") || message.contains("WRONGTYPE")
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use tally_store::ErrorKind;

    use super::*;

    #[test]
    fn type_error_maps_to_decode() {
        let err = RedisError::from((RedisErrorKind::TypeError, "response was of incompatible type"));
        assert_eq!(map_redis_error(err).kind(), ErrorKind::Decode);
    }

    #[test]
    fn incr_on_text_maps_to_decode() {
        let err = RedisError::from((
            RedisErrorKind::ResponseError,
            "An error was signalled by the server",
            "value is not an integer or out of range".to_owned(),
        ));
        assert_eq!(map_redis_error(err).kind(), ErrorKind::Decode);
    }

    #[test]
    fn wrong_type_maps_to_decode() {
        let err = RedisError::from((
            RedisErrorKind::ExtensionError,
            "WRONGTYPE",
            "Operation against a key holding the wrong kind of value".to_owned(),
        ));
        assert_eq!(map_redis_error(err).kind(), ErrorKind::Decode);
    }

    #[test]
    fn connection_failures_map_to_store_unavailable() {
        let err = RedisError::from((RedisErrorKind::IoError, "connection refused"));
        assert_eq!(map_redis_error(err).kind(), ErrorKind::StoreUnavailable);

        let err = RedisError::from((RedisErrorKind::ResponseError, "OOM command not allowed"));
        assert_eq!(map_redis_error(err).kind(), ErrorKind::StoreUnavailable);
    }
}
