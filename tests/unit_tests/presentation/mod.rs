mod api_error_test;
